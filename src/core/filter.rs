use chrono::NaiveDate;

const UPLOAD_DATE_FORMAT: &str = "%Y%m%d";

/// Metadata of one playlist video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    /// Raw `YYYYMMDD` string as reported by the platform, possibly empty.
    pub upload_date: String,
    pub url: String,
}

/// Why a video was left out of the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    KeywordMissing,
    OutsideWindow,
}

/// Keyword and recency rules evaluated against a fixed run date.
#[derive(Debug, Clone)]
pub struct VideoFilter {
    keyword: String,
    days_back: i64,
    today: NaiveDate,
}

impl VideoFilter {
    pub fn new(keyword: &str, days_back: i64, today: NaiveDate) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            days_back,
            today,
        }
    }

    pub fn check(&self, video: &VideoRecord) -> Result<(), Rejection> {
        if !title_matches(&video.title, &self.keyword) {
            return Err(Rejection::KeywordMissing);
        }
        if !within_days(&video.upload_date, self.days_back, self.today) {
            return Err(Rejection::OutsideWindow);
        }
        Ok(())
    }
}

pub fn title_matches(title: &str, keyword: &str) -> bool {
    title.to_lowercase().contains(&keyword.to_lowercase())
}

/// Strict `YYYYMMDD` parse.
pub fn parse_upload_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, UPLOAD_DATE_FORMAT).ok()
}

/// True when `upload_date` lies in `[today - days, today]`.
pub fn within_days(upload_date: &str, days: i64, today: NaiveDate) -> bool {
    let Some(date) = parse_upload_date(upload_date) else {
        return false;
    };
    let delta = (today - date).num_days();
    (0..=days).contains(&delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn video(title: &str, upload_date: &str) -> VideoRecord {
        VideoRecord {
            id: "abc123".into(),
            title: title.into(),
            upload_date: upload_date.into(),
            url: "https://www.youtube.com/watch?v=abc123".into(),
        }
    }

    #[test]
    fn window_includes_recent_dates() {
        let today = day(2024, 1, 20);
        assert!(within_days("20240115", 30, today));
        assert!(!within_days("20240115", 3, today));
    }

    #[test]
    fn window_edges() {
        let today = day(2024, 1, 20);
        assert!(within_days("20240120", 0, today));
        assert!(within_days("20231221", 30, today));
        assert!(!within_days("20231220", 30, today));
        assert!(!within_days("20240121", 30, today));
    }

    #[test]
    fn unparseable_dates_are_excluded() {
        let today = day(2024, 1, 20);
        assert!(!within_days("", 30, today));
        assert!(!within_days("2024-01-15", 30, today));
        assert!(!within_days("20241315", 400, today));
        assert!(!within_days("2024115", 30, today));
        assert!(!within_days("+2024011", 30, today));
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(title_matches("Sprint Planning Q3", "sprint"));
        assert!(title_matches("TinaCMS - SPRINT review", "Sprint"));
        assert!(!title_matches("Roadmap Review", "sprint"));
    }

    #[test]
    fn filter_reports_first_failing_rule() {
        let filter = VideoFilter::new("sprint", 30, day(2024, 1, 20));
        assert_eq!(filter.check(&video("Sprint 42 Review", "20240118")), Ok(()));
        assert_eq!(
            filter.check(&video("Roadmap", "20240118")),
            Err(Rejection::KeywordMissing)
        );
        assert_eq!(
            filter.check(&video("Sprint 12 Review", "20230101")),
            Err(Rejection::OutsideWindow)
        );
    }

    #[test]
    fn parses_strict_format_only() {
        assert_eq!(parse_upload_date("20240115"), Some(day(2024, 1, 15)));
        assert_eq!(parse_upload_date("20240230"), None);
    }
}
