//! Maps a raw (listing, detail) pair onto the published [`Pet`] shape.
//!
//! Everything here is pure: no network, no disk, no clock.

use std::sync::LazyLock;

use regex::Regex;

use crate::formats::{Attribute, Pet, RawDetail, RawListing};

/// Delivery URL prefix for the 800x600 crop; the image id is appended.
pub const HIGH_RES_IMAGE_BASE: &str =
    "https://media.adoptapet.com/image/upload/c_fill,w_800,h_600,g_auto/f_auto,q_auto/";

/// Detail page used when the detail record carries no canonical URL.
pub const DEFAULT_PET_URL_BASE: &str = "https://www.adoptapet.com/pet/";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static REFERENCE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"##\d+##").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Tunables for quirks of the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Characters kept in a truncated short description.
    pub short_description_limit: usize,
    /// Appended to a truncated short description.
    pub ellipsis: &'static str,
    /// Photo URLs containing this are upstream placeholders.
    pub placeholder_marker: &'static str,
    /// Short descriptions stop before this phrase (case-insensitive).
    pub contact_marker: &'static str,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            short_description_limit: 200,
            ellipsis: "...",
            placeholder_marker: "/null",
            contact_marker: "Please email",
        }
    }
}

pub fn normalize(listing: &RawListing, detail: Option<&RawDetail>) -> Pet {
    normalize_with(&NormalizeOptions::default(), listing, detail)
}

pub fn normalize_with(
    options: &NormalizeOptions,
    listing: &RawListing,
    detail: Option<&RawDetail>,
) -> Pet {
    let raw_description = detail.and_then(|d| d.description.as_deref());
    let description = raw_description.and_then(clean_description);
    let short_description = description
        .as_deref()
        .map(|desc| short_description(options, desc));

    let url = detail
        .and_then(|d| d.pet_details_url.as_deref())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map_or_else(|| default_pet_url(&listing.pet_id), str::to_owned);

    Pet {
        id: listing.pet_id.clone(),
        name: listing.pet_name.clone(),
        pet_type: pet_type(listing.species.as_deref()),
        breed: breed(
            listing.primary_breed.as_deref(),
            listing.secondary_breed.as_deref(),
        ),
        age: listing
            .age
            .as_deref()
            .filter(|age| !age.trim().is_empty())
            .map(capitalize_first),
        sex: sex(listing.sex.as_deref()),
        size: listing.size.clone(),
        url,
        photo_url: resolve_photo_url(options, listing, detail),
        description,
        short_description,
        description_html: raw_description.and_then(sanitize_description_html),
        description_markdown: raw_description.and_then(description_markdown),
        color: detail
            .and_then(|d| d.color.as_deref())
            .map(str::trim)
            .filter(|color| !color.is_empty())
            .map(str::to_owned),
        attributes: detail.map(attributes).unwrap_or_default(),
    }
}

/// Photo precedence: first usable detail image (re-cropped), then the listing photo.
/// Placeholder URLs resolve to no photo at all.
pub fn resolve_photo_url(
    options: &NormalizeOptions,
    listing: &RawListing,
    detail: Option<&RawDetail>,
) -> Option<String> {
    let from_detail = detail.and_then(|d| {
        d.images.iter().find_map(|image| {
            image
                .original_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
        })
    });

    from_detail
        .map(high_res_image_url)
        .or_else(|| {
            listing
                .photo_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .map(str::to_owned)
        })
        .filter(|url| !url.contains(options.placeholder_marker))
}

/// `.../upload/v123/1268757503.jpg` -> `{HIGH_RES_IMAGE_BASE}1268757503`.
/// A URL without a usable trailing segment is returned as is.
pub fn high_res_image_url(original_url: &str) -> String {
    let last_segment = original_url.rsplit('/').next().unwrap_or(original_url);
    let image_id = last_segment.split('.').next().unwrap_or_default();
    if image_id.trim().is_empty() {
        return original_url.to_owned();
    }
    format!("{HIGH_RES_IMAGE_BASE}{image_id}")
}

pub fn pet_type(species: Option<&str>) -> String {
    let Some(species) = species.filter(|s| !s.trim().is_empty()) else {
        return "Other".to_owned();
    };
    match species.trim().to_lowercase().as_str() {
        "dog" => "Dog".to_owned(),
        "cat" => "Cat".to_owned(),
        _ => species.to_owned(),
    }
}

pub fn breed(primary: Option<&str>, secondary: Option<&str>) -> Option<String> {
    let joined = [primary, secondary]
        .into_iter()
        .flatten()
        .filter(|b| !b.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    (!joined.is_empty()).then_some(joined)
}

pub fn sex(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let label = match raw.trim().to_lowercase().as_str() {
        "m" => "Male".to_owned(),
        "f" => "Female".to_owned(),
        _ => raw.to_owned(),
    };
    Some(label)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Plain-text description: entities decoded, tags and `##123##` codes removed,
/// whitespace collapsed. Blank input yields `None`.
pub fn clean_description(raw: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw);
    let no_tags = TAG_RE.replace_all(&decoded, " ");
    let no_refs = REFERENCE_CODE_RE.replace_all(&no_tags, "");
    let collapsed = WHITESPACE_RE.replace_all(&no_refs, " ");
    let cleaned = collapsed.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

pub fn short_description(options: &NormalizeOptions, description: &str) -> String {
    if let Some(idx) = find_ascii_case_insensitive(description, options.contact_marker)
        && idx > 0
    {
        return description[..idx].trim().to_owned();
    }

    if description.chars().count() > options.short_description_limit {
        let head = description
            .chars()
            .take(options.short_description_limit)
            .collect::<String>();
        return format!("{}{}", head.trim(), options.ellipsis);
    }

    description.to_owned()
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let bytes = haystack.as_bytes();
    let needle = needle.as_bytes();
    haystack.char_indices().map(|(idx, _)| idx).find(|&idx| {
        bytes
            .get(idx..idx + needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}

fn default_pet_url(pet_id: &str) -> String {
    format!("{DEFAULT_PET_URL_BASE}{pet_id}")
}

fn sanitize_description_html(raw: &str) -> Option<String> {
    let sanitized = REFERENCE_CODE_RE.replace_all(raw, "");
    let sanitized = sanitized.trim();
    (!sanitized.is_empty()).then(|| sanitized.to_owned())
}

/// Markdown with exactly one blank line between blocks.
fn description_markdown(raw: &str) -> Option<String> {
    let sanitized = REFERENCE_CODE_RE.replace_all(raw, "");
    let markdown = html2md::parse_html(&sanitized);
    let single_spaced = BLANK_LINES_RE.replace_all(markdown.trim(), "\n");
    let markdown = single_spaced.replace('\n', "\n\n");
    (!markdown.trim().is_empty()).then_some(markdown)
}

fn attributes(detail: &RawDetail) -> Vec<Attribute> {
    let flags = [
        ("good_with_cats", "Good with cats", detail.good_with_cats),
        ("good_with_dogs", "Good with dogs", detail.good_with_dogs),
        ("good_with_kids", "Good with kids", detail.good_with_kids),
        ("housetrained", "Housetrained", detail.housetrained),
        ("shots_current", "Shots current", detail.shots_current),
        ("spayed_neutered", "Spayed/Neutered", detail.spayed_neutered),
        ("special_needs", "Special needs", detail.special_needs),
        ("declawed", "Declawed", detail.declawed),
    ];

    flags
        .into_iter()
        .filter(|(_, _, value)| *value == Some(1))
        .map(|(key, display, _)| Attribute {
            key: key.to_owned(),
            display: display.to_owned(),
        })
        .collect()
}
