//! Post-processing of model output.

/// Characters of the prompt kept in a script file name.
pub const FILENAME_PROMPT_CHARS: usize = 30;

/// Label every non-empty line as `Topic N: ...`.
///
/// Lines the model already labeled (anything starting with `Topic`) are kept
/// as they are but still advance the counter.
pub fn label_topics(raw: &str) -> Vec<String> {
    let mut topics = Vec::new();
    let mut count = 1;
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("Topic") {
            topics.push(line.to_string());
        } else {
            topics.push(format!("Topic {}: {}", count, line));
        }
        count += 1;
    }
    topics
}

/// Clean up a generated script.
pub fn clean_script(raw: &str) -> String {
    raw.trim().to_string()
}

/// File name for a saved script, derived from the start of the prompt.
///
/// Prompts that agree on their first [`FILENAME_PROMPT_CHARS`] characters map
/// to the same name.
pub fn output_filename(prompt: &str) -> String {
    let stem: String = prompt
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .take(FILENAME_PROMPT_CHARS)
        .collect();
    format!("script_{}.txt", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_topics_numbers_plain_lines() {
        let topics = label_topics("AI art tricks\nPrompting 101\nBest free tools\n");
        assert_eq!(
            topics,
            vec![
                "Topic 1: AI art tricks",
                "Topic 2: Prompting 101",
                "Topic 3: Best free tools",
            ]
        );
    }

    #[test]
    fn test_label_topics_keeps_existing_labels_and_counts_them() {
        let topics = label_topics("Topic 1: Already done\nSecond idea\nTopic: odd label\nFourth");
        assert_eq!(
            topics,
            vec![
                "Topic 1: Already done",
                "Topic 2: Second idea",
                "Topic: odd label",
                "Topic 4: Fourth",
            ]
        );
    }

    #[test]
    fn test_label_topics_skips_blank_lines_and_trims() {
        let topics = label_topics("\n  first  \n\n\t\nsecond\r\n");
        assert_eq!(topics, vec!["Topic 1: first", "Topic 2: second"]);
        assert!(label_topics("  \n \n").is_empty());
    }

    #[test]
    fn test_label_topics_does_not_strip_list_markers() {
        assert_eq!(label_topics("1. Idea"), vec!["Topic 1: 1. Idea"]);
    }

    #[test]
    fn test_clean_script_trims() {
        assert_eq!(clean_script("\n\n  Hook line.\nBody.  \n"), "Hook line.\nBody.");
    }

    #[test]
    fn test_output_filename_replaces_spaces() {
        assert_eq!(
            output_filename("How to make coffee"),
            "script_How_to_make_coffee.txt"
        );
    }

    #[test]
    fn test_output_filename_truncates_to_thirty_chars() {
        let name = output_filename("The history of space exploration in the 20th century");
        assert_eq!(name, "script_The_history_of_space_explorati.txt");
        assert_eq!(name.len(), "script_".len() + FILENAME_PROMPT_CHARS + ".txt".len());
    }

    #[test]
    fn test_output_filename_is_deterministic_and_collides_past_boundary() {
        let a = "The history of space exploration: part one";
        let b = "The history of space exploration: part two";
        assert_eq!(output_filename(a), output_filename(a));
        assert_eq!(output_filename(a), output_filename(b));
        assert_ne!(output_filename("coffee"), output_filename("tea"));
    }

    #[test]
    fn test_output_filename_never_nests_directories() {
        let name = output_filename("../etc/passwd and C:\\temp");
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
    }

    #[test]
    fn test_output_filename_counts_characters_not_bytes() {
        let name = output_filename(&"é".repeat(40));
        assert_eq!(name, format!("script_{}.txt", "é".repeat(30)));
    }
}
