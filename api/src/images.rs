//! Provider image URL normalization.

pub const PLACEHOLDER_PLAYER_IMAGE: &str =
    "https://www.thesportsdb.com/images/shared/placeholders/player_placeholder.png";
pub const PLACEHOLDER_TEAM_IMAGE: &str =
    "https://www.thesportsdb.com/images/shared/placeholders/team_placeholder.png";

/// The provider sometimes appends `/preview`, which serves an HTML page rather
/// than the image.
const PREVIEW_SUFFIX: &str = "/preview";

/// Strip the `/preview` suffix; `None` for absent or blank input.
pub fn clean_image_url(url: Option<&str>) -> Option<String> {
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;
    let url = url.strip_suffix(PREVIEW_SUFFIX).unwrap_or(url);
    (!url.is_empty()).then(|| url.to_owned())
}

/// First usable candidate, cleaned, or the placeholder.
pub fn image_or(candidates: &[Option<&str>], placeholder: &str) -> String {
    candidates
        .iter()
        .find_map(|c| clean_image_url(*c))
        .unwrap_or_else(|| placeholder.to_owned())
}

pub fn team_logo(candidates: &[Option<&str>]) -> String {
    image_or(candidates, PLACEHOLDER_TEAM_IMAGE)
}

pub fn player_photo(candidates: &[Option<&str>]) -> String {
    image_or(candidates, PLACEHOLDER_PLAYER_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_suffix_is_removed() {
        assert_eq!(
            clean_image_url(Some("https://r2.thesportsdb.com/images/media/team/badge/abc.png/preview")),
            Some("https://r2.thesportsdb.com/images/media/team/badge/abc.png".to_owned())
        );
    }

    #[test]
    fn plain_urls_pass_through() {
        let url = "https://r2.thesportsdb.com/images/media/player/cutout/x.png";
        assert_eq!(clean_image_url(Some(url)).as_deref(), Some(url));
    }

    #[test]
    fn absent_or_blank_is_placeholder() {
        assert_eq!(team_logo(&[None]), PLACEHOLDER_TEAM_IMAGE);
        assert_eq!(team_logo(&[Some("   ")]), PLACEHOLDER_TEAM_IMAGE);
        assert_eq!(player_photo(&[]), PLACEHOLDER_PLAYER_IMAGE);
        assert_eq!(team_logo(&[Some("/preview")]), PLACEHOLDER_TEAM_IMAGE);
    }

    #[test]
    fn first_usable_candidate_wins() {
        let photo = player_photo(&[None, Some("https://x/thumb.jpg/preview"), Some("https://x/other.jpg")]);
        assert_eq!(photo, "https://x/thumb.jpg");
    }
}
