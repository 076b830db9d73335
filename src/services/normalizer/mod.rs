//! Stream Response Normalizer
//!
//! Turns the loosely-typed payload of the scraping backend into the canonical
//! [`StreamData`] served by the HTTP API and rendered by the Telegram bot.
//!
//! # Overview
//!
//! - **Meta**: book fields are read independently, each with its own default
//! - **Episodes**: one per upstream chapter, in upstream order
//! - **Sources**: every variant of every CDN group of a chapter, minus the
//!   unplayable ones, ranked default-first then by quality
//!
//! The normalizer is a pure function. It never fails: malformed input at any
//! level degrades to empty containers and zero counts.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::services::normalizer::normalize_stream_response;
//!
//! let upstream = client.fetch_stream("41000102558", 1).await;
//! let StreamData { meta, episodes } = normalize_stream_response(Some(&upstream.data));
//! ```

pub mod coerce;

use serde_json::Value;
use std::cmp::Ordering;

use crate::models::{
    Episode, Orientation, RawBookData, RawChapter, RawCdnGroup, RawUpstreamPayload, RawVariant,
    Source, StreamData, StreamMeta,
};

/// Normalize an arbitrary upstream JSON value.
pub fn normalize_stream_response(raw: Option<&Value>) -> StreamData {
    normalize_payload(&RawUpstreamPayload::from_value(raw))
}

/// Normalize an already-parsed upstream payload.
pub fn normalize_payload(payload: &RawUpstreamPayload) -> StreamData {
    let empty = RawBookData::default();
    let data = payload.data.as_ref().unwrap_or(&empty);

    let chapters = data.chapter_list.as_deref().unwrap_or_default();

    StreamData {
        meta: build_meta(data),
        episodes: chapters.iter().map(build_episode).collect(),
    }
}

fn build_meta(data: &RawBookData) -> StreamMeta {
    // An explicit count wins over the list length, even when they disagree.
    let chapter_count = coerce::to_int(data.chapter_count.as_ref())
        .or_else(|| {
            data.chapter_list
                .as_ref()
                .map(|list| i64::try_from(list.len()).unwrap_or(i64::MAX))
        })
        .unwrap_or(0);

    StreamMeta {
        book_id: coerce::to_id(data.book_id.as_ref()),
        book_name: coerce::to_str(data.book_name.as_ref()),
        book_cover: coerce::to_str(data.book_cover.as_ref()),
        play_count: data.play_count.clone(),
        corner: data.corner.clone().unwrap_or(Value::Null),
        chapter_count,
        description: coerce::to_str(data.introduction.as_ref()).unwrap_or_default(),
        tags: coerce::to_str_list(data.tags.as_deref()),
        orientation: Orientation::Portrait,
    }
}

fn build_episode(chapter: &RawChapter) -> Episode {
    let index = coerce::to_int(chapter.chapter_index.as_ref()).unwrap_or(0);
    let name = coerce::to_str(chapter.chapter_name.as_ref())
        .unwrap_or_else(|| format!("EP {}", index.saturating_add(1)));

    let mut sources: Vec<Source> = chapter
        .cdn_list
        .as_deref()
        .unwrap_or_default()
        .iter()
        .flat_map(|group| {
            group
                .video_path_list
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(move |variant| candidate_source(group, variant))
        })
        .filter(is_playable)
        .collect();

    rank_sources(&mut sources);

    Episode {
        id: coerce::to_id(chapter.chapter_id.as_ref()).unwrap_or_default(),
        index,
        name,
        thumbnail: coerce::to_str(chapter.chapter_img.as_ref()),
        is_charge: coerce::is_truthy(chapter.is_charge.as_ref())
            || coerce::is_truthy(chapter.charge_chapter.as_ref()),
        sources,
    }
}

fn candidate_source(group: &RawCdnGroup, variant: &RawVariant) -> Source {
    Source {
        url: coerce::to_str(variant.video_path.as_ref()).unwrap_or_default(),
        quality: coerce::to_int(variant.quality.as_ref()).unwrap_or(0),
        cdn: coerce::to_id(group.cdn_domain.as_ref()).unwrap_or_default(),
        // Both the group and the variant have to agree.
        is_default: coerce::flag_is_set(group.is_default.as_ref())
            && coerce::flag_is_set(variant.is_default.as_ref()),
        is_vip: coerce::flag_is_set(variant.is_vip_equity.as_ref()),
    }
}

fn is_playable(source: &Source) -> bool {
    !source.url.is_empty() && source.quality > 0
}

/// Default sources first, then by descending quality.
fn compare_sources(a: &Source, b: &Source) -> Ordering {
    b.is_default
        .cmp(&a.is_default)
        .then_with(|| b.quality.cmp(&a.quality))
}

/// Stable sort: ties keep their upstream order.
fn rank_sources(sources: &mut [Source]) {
    sources.sort_by(compare_sources);
}
