use crate::models::Fact;

/// LinkedIn rejects share commentary above 3000 characters.
pub const LINKEDIN_CHAR_LIMIT: usize = 3000;

const TRUNCATION_MARKER: char = '…';

/// Build the post body from a fact. Pure and deterministic: same fact in,
/// same text out, no I/O.
pub fn format_post(fact: &Fact) -> String {
    let body = strip_boilerplate(&fact.body);
    let body = emojify_bullets(&body);

    let mut post = String::with_capacity(body.len() + 128);
    post.push_str(body.trim());
    post.push_str("\n\n");
    post.push_str(&topic_hashtag(&fact.topic));
    post.push_str(" #DailyFact #TodayILearned");
    post.push_str("\n\nSource:\n");
    post.push_str(&fact.source_url);

    enforce_limit(post)
}

/// Drop a leading "Here is a summary:" style preamble. Boilerplate is an
/// opening line that ends with a colon and precedes a blank line; a
/// colon-ended line running straight into content is part of the fact.
fn strip_boilerplate(text: &str) -> String {
    let trimmed = text.trim();
    if let Some((first, rest)) = trimmed.split_once('\n') {
        let next_is_blank = rest.lines().next().is_some_and(|l| l.trim().is_empty());
        if first.trim_end().ends_with(':') && next_is_blank {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Rewrite plain bullet markers into emoji-prefixed lines.
fn emojify_bullets(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
                .or_else(|| trimmed.strip_prefix("• "))
            {
                format!("🔹 {}", rest)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Derive a CamelCase hashtag from the topic, e.g. "ocean life" -> "#OceanLife".
fn topic_hashtag(topic: &str) -> String {
    let mut tag = String::from("#");
    for word in topic.split_whitespace() {
        let mut chars = word.chars().filter(|c| c.is_alphanumeric());
        if let Some(first) = chars.next() {
            tag.extend(first.to_uppercase());
            tag.extend(chars);
        }
    }
    if tag.len() == 1 {
        tag.push_str("DailyTopic");
    }
    tag
}

fn enforce_limit(post: String) -> String {
    if post.chars().count() <= LINKEDIN_CHAR_LIMIT {
        return post;
    }
    let mut truncated: String = post.chars().take(LINKEDIN_CHAR_LIMIT - 1).collect();
    truncated.push(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fact(body: &str, topic: &str) -> Fact {
        Fact {
            topic: topic.to_string(),
            source_url: "https://example.com/article".to_string(),
            body: body.to_string(),
            retrieved_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_contains_fact_body_and_topic_hashtag() {
        let post = format_post(&fact("Honey never spoils. [1]", "culinary science"));
        assert!(post.contains("Honey never spoils. [1]"));
        assert!(post.contains("#CulinaryScience"));
        assert!(post.contains("Source:\nhttps://example.com/article"));
    }

    #[test]
    fn test_boilerplate_preamble_is_stripped() {
        let post = format_post(&fact(
            "Here is a summary of the article:\n\nThe deep sea hosts glowing sharks.",
            "ocean life",
        ));
        assert!(!post.contains("Here is a summary"));
        assert!(post.starts_with("The deep sea hosts glowing sharks."));
    }

    #[test]
    fn test_colon_line_without_blank_line_is_kept() {
        let post = format_post(&fact(
            "The treaty of 1848:\nIt ended the war.",
            "history",
        ));
        assert!(post.starts_with("The treaty of 1848:\nIt ended the war."));
    }

    #[test]
    fn test_long_preamble_before_blank_line_is_stripped() {
        let post = format_post(&fact(
            "Certainly! Here is a concise and interesting summary of the key finding in the article:\n\nBees can count landmarks.",
            "biology",
        ));
        assert!(!post.contains("Certainly!"));
        assert!(post.starts_with("Bees can count landmarks."));
    }

    #[test]
    fn test_bullets_become_emoji_lines() {
        let post = format_post(&fact(
            "Key findings:\n- First point\n* Second point\n• Third point",
            "biology",
        ));
        assert!(post.contains("🔹 First point"));
        assert!(post.contains("🔹 Second point"));
        assert!(post.contains("🔹 Third point"));
        assert!(!post.contains("\n- "));
    }

    #[test]
    fn test_output_never_exceeds_ceiling() {
        let long_body = "word ".repeat(2000);
        let post = format_post(&fact(&long_body, "history"));
        assert!(post.chars().count() <= LINKEDIN_CHAR_LIMIT);
        assert!(post.ends_with('…'));
    }

    #[test]
    fn test_short_post_is_not_truncated() {
        let post = format_post(&fact("Short fact. [1]", "history"));
        assert!(!post.ends_with('…'));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let f = fact("Same input. [1]", "quantum physics");
        assert_eq!(format_post(&f), format_post(&f));
    }

    #[test]
    fn test_hashtag_drops_punctuation() {
        assert_eq!(topic_hashtag("AI & robotics"), "#AIRobotics");
        assert_eq!(topic_hashtag("ocean life"), "#OceanLife");
    }
}
