//! Text for the `quiz-me` prompt.

use infodiet::diet::types::Item;

/// One line per finished item: `- "Title" by Author (type) [tag, tag]`.
pub fn item_line(item: &Item) -> String {
    let mut line = format!("- \"{}\"", item.title);
    if let Some(author) = item.author.as_deref().filter(|a| !a.is_empty()) {
        line.push_str(&format!(" by {author}"));
    }
    line.push_str(&format!(" ({})", item.item_type));
    if !item.tags.is_empty() {
        line.push_str(&format!(" [{}]", item.tags.join(", ")));
    }
    line
}

pub fn quiz_prompt(finished: &[Item], topic: Option<&str>) -> String {
    let topic_clause = match topic.filter(|t| !t.is_empty()) {
        Some(topic) => format!(" Focus specifically on \"{topic}\"."),
        None => String::new(),
    };

    let item_list = if finished.is_empty() {
        "(No finished items yet)".to_string()
    } else {
        finished.iter().map(item_line).collect::<Vec<_>>().join("\n")
    };

    format!(
        "Based on my reading/watching/listening history, quiz me to test my understanding \
         and retention.{topic_clause}\n\n\
         Here are the items I've finished:\n\
         {item_list}\n\n\
         Generate 5 thought-provoking questions that test comprehension, connections between \
         ideas, and practical application. After I answer, provide feedback and scoring."
    )
}
