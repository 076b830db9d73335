//! Chat text and keyboard rendering
//!
//! Everything here works on the full normalized result and applies the
//! preview limits itself.

use serde_json::Value;

use super::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::models::{Episode, StreamData};
use crate::services::dramabox::BookItem;

pub const TAG_PREVIEW: usize = 5;
pub const DESCRIPTION_PREVIEW_CHARS: usize = 320;
pub const EPISODE_PREVIEW: usize = 3;

const UNTITLED: &str = "Tanpa judul";

/// Play counts are opaque; show strings and non-zero numbers as they are.
fn display_play_count(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn tag_line(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }
    let preview: Vec<&str> = tags.iter().take(TAG_PREVIEW).map(String::as_str).collect();
    Some(format!("Tag: {}", preview.join(", ")))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// One entry of the latest/search lists
pub fn format_item(item: &BookItem) -> String {
    let mut lines = vec![format!("📺 {}", item.book_name)];
    lines.extend(tag_line(&item.tags));
    if let Some(count) = display_play_count(item.play_count.as_ref()) {
        lines.push(format!("Ditonton: {}", count));
    }
    if item.chapter_count != 0 {
        lines.push(format!("Episode: {}", item.chapter_count));
    }
    lines.join("\n")
}

/// Button that opens the detail view of a book
pub fn build_detail_keyboard(book_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton::callback(
            "Lihat episode",
            format!("detail:{}", book_id),
        )]],
    }
}

fn episode_line(episode: &Episode) -> String {
    let label = format!("E{} - {}", episode.number(), episode.name);
    match episode.top_source() {
        Some(source) => format!("{}: {}p {}", label, source.quality, source.url),
        None => format!("{}: sumber tidak tersedia", label),
    }
}

/// Detail message for a normalized stream
pub fn format_detail(stream: &StreamData) -> String {
    let meta = &stream.meta;

    let mut header = vec![format!(
        "📺 {}",
        meta.book_name.as_deref().unwrap_or(UNTITLED)
    )];
    if let Some(count) = display_play_count(meta.play_count.as_ref()) {
        header.push(format!("Ditonton: {}", count));
    }
    if meta.chapter_count != 0 {
        header.push(format!("Total episode: {}", meta.chapter_count));
    }
    header.extend(tag_line(&meta.tags));

    let mut sections = vec![header.join("\n")];

    let description = truncate_chars(&meta.description, DESCRIPTION_PREVIEW_CHARS);
    if !description.is_empty() {
        sections.push(format!("Ringkasan: {}", description));
    }

    let episode_lines: Vec<String> = stream
        .episodes
        .iter()
        .take(EPISODE_PREVIEW)
        .map(episode_line)
        .collect();
    if !episode_lines.is_empty() {
        sections.push(format!("Episode pertama:\n{}", episode_lines.join("\n")));
    }

    sections.join("\n\n")
}

/// URL buttons for the first playable episodes, `None` when nothing is playable
pub fn build_episode_buttons(episodes: &[Episode]) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = episodes
        .iter()
        .filter_map(|episode| {
            episode
                .top_source()
                .filter(|source| !source.url.is_empty())
                .map(|source| (episode, source))
        })
        .take(EPISODE_PREVIEW)
        .map(|(episode, source)| {
            let mut text = format!("Putar E{}", episode.number());
            if source.quality > 0 {
                text.push_str(&format!(" ({}p)", source.quality));
            }
            vec![InlineKeyboardButton::url(text, source.url.clone())]
        })
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup {
            inline_keyboard: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalizer::normalize_stream_response;
    use serde_json::json;

    fn sample_stream() -> StreamData {
        let chapters: Vec<Value> = (0..5)
            .map(|i| {
                let cdn = if i == 1 {
                    json!([])
                } else {
                    json!([{"cdnDomain": "cdn", "isDefault": 1, "videoPathList": [
                        {"videoPath": format!("https://v/{}/540.m3u8", i), "quality": 540, "isDefault": 0},
                        {"videoPath": format!("https://v/{}/720.m3u8", i), "quality": 720, "isDefault": 1}
                    ]}])
                };
                json!({"chapterId": i, "chapterIndex": i, "cdnList": cdn})
            })
            .collect();

        normalize_stream_response(Some(&json!({
            "data": {
                "bookId": "41000102558",
                "bookName": "Hidden Heir",
                "playCount": "3.1M",
                "chapterCount": 80,
                "introduction": "x".repeat(400),
                "tags": ["A", "B", "C", "D", "E", "F"],
                "chapterList": chapters
            }
        })))
    }

    #[test]
    fn test_format_detail() {
        let text = format_detail(&sample_stream());
        let sections: Vec<&str> = text.split("\n\n").collect();

        assert_eq!(sections.len(), 3);
        assert_eq!(
            sections[0],
            "📺 Hidden Heir\nDitonton: 3.1M\nTotal episode: 80\nTag: A, B, C, D, E"
        );
        assert_eq!(sections[1], format!("Ringkasan: {}", "x".repeat(320)));
        assert_eq!(
            sections[2],
            "Episode pertama:\n\
             E1 - EP 1: 720p https://v/0/720.m3u8\n\
             E2 - EP 2: sumber tidak tersedia\n\
             E3 - EP 3: 720p https://v/2/720.m3u8"
        );
    }

    #[test]
    fn test_format_detail_minimal() {
        let text = format_detail(&normalize_stream_response(None));
        assert_eq!(text, "📺 Tanpa judul");
    }

    #[test]
    fn test_episode_buttons_skip_unplayable() {
        let markup = build_episode_buttons(&sample_stream().episodes).unwrap();
        let buttons: Vec<(&str, &str)> = markup
            .inline_keyboard
            .iter()
            .map(|row| (row[0].text.as_str(), row[0].url.as_deref().unwrap()))
            .collect();

        assert_eq!(
            buttons,
            vec![
                ("Putar E1 (720p)", "https://v/0/720.m3u8"),
                ("Putar E3 (720p)", "https://v/2/720.m3u8"),
                ("Putar E4 (720p)", "https://v/3/720.m3u8"),
            ]
        );
    }

    #[test]
    fn test_episode_buttons_none_when_nothing_playable() {
        assert!(build_episode_buttons(&[]).is_none());
        let stream = normalize_stream_response(Some(&json!({
            "data": {"chapterList": [{"chapterId": "1"}]}
        })));
        assert!(build_episode_buttons(&stream.episodes).is_none());
    }

    #[test]
    fn test_format_item() {
        let item = BookItem {
            book_id: "1".to_string(),
            book_name: "Hidden Heir".to_string(),
            cover: None,
            introduction: String::new(),
            tags: vec!["Revenge".to_string(), "CEO".to_string()],
            play_count: Some(json!(0)),
            chapter_count: 62,
        };
        assert_eq!(format_item(&item), "📺 Hidden Heir\nTag: Revenge, CEO\nEpisode: 62");
    }

    #[test]
    fn test_detail_keyboard() {
        let markup = build_detail_keyboard("41000102558");
        assert_eq!(
            markup.inline_keyboard[0][0].callback_data.as_deref(),
            Some("detail:41000102558")
        );
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("drama 🎬🎬🎬", 7), "drama 🎬");
        assert_eq!(truncate_chars("short", 320), "short");
    }
}
