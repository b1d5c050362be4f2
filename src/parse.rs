use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::{BookRecord, Error, Result, EXPECTED_ROWS_PER_PAGE};

const ROW_SELECTOR: &str = r#"tr[itemtype="http://schema.org/Book"]"#;
const TITLE_SELECTOR: &str = "a.bookTitle";
const AUTHOR_SELECTOR: &str = "a.authorName";
const RATING_SELECTOR: &str = "span.minirating";

const RATING_SEPARATOR: char = '—';
const MAX_RATING: f64 = 5.0;

/// What the extractor made of a single listing row.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(BookRecord),
    Skip(SkipReason),
}

impl Extraction {
    pub fn record(self) -> Option<BookRecord> {
        match self {
            Extraction::Record(record) => Some(record),
            Extraction::Skip(_) => None,
        }
    }
}

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("row has no title label")]
    MissingTitle,
    #[error("row has no author label")]
    MissingAuthor,
    #[error("row has no rating label")]
    MissingRating,
    #[error("{0} label is empty")]
    EmptyField(&'static str),
    #[error("rating label `{0}` has no em-dash separator")]
    MissingSeparator(String),
    #[error("`{0}` is not an average rating")]
    BadRating(String),
    #[error("average rating {0} is outside 0..=5")]
    RatingOutOfRange(String),
    #[error("`{0}` is not a rating count")]
    BadCount(String),
}

/// Pulls a [`BookRecord`] out of one listing row. Never fails outright: a row
/// that doesn't look right comes back as [`Extraction::Skip`].
#[derive(Debug, Clone)]
pub struct RowExtractor {
    title: Selector,
    author: Selector,
    rating: Selector,
}

impl RowExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: create_selector(TITLE_SELECTOR)?,
            author: create_selector(AUTHOR_SELECTOR)?,
            rating: create_selector(RATING_SELECTOR)?,
        })
    }

    pub fn extract(&self, row: ElementRef<'_>) -> Extraction {
        match self.try_extract(row) {
            Ok(record) => Extraction::Record(record),
            Err(reason) => Extraction::Skip(reason),
        }
    }

    fn try_extract(&self, row: ElementRef<'_>) -> core::result::Result<BookRecord, SkipReason> {
        let title = label_text(row, &self.title).ok_or(SkipReason::MissingTitle)?;
        let author = label_text(row, &self.author).ok_or(SkipReason::MissingAuthor)?;
        let rating_text = label_text(row, &self.rating).ok_or(SkipReason::MissingRating)?;

        if title.is_empty() {
            return Err(SkipReason::EmptyField("title"));
        }
        if author.is_empty() {
            return Err(SkipReason::EmptyField("author"));
        }
        let (avg_rating, num_ratings) = parse_rating(&rating_text)?;

        Ok(BookRecord {
            title,
            author,
            avg_rating,
            num_ratings,
        })
    }
}

/// Result of parsing one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Book rows present in the markup, whether or not they could be read.
    pub rows_found: usize,
    pub records: Vec<BookRecord>,
    pub skipped: usize,
}

/// Finds the book rows on a listing page and runs the [`RowExtractor`] over them.
#[derive(Debug, Clone)]
pub struct PageParser {
    row: Selector,
    extractor: RowExtractor,
}

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: create_selector(ROW_SELECTOR)?,
            extractor: RowExtractor::new()?,
        })
    }

    /// Document order is kept. The parsed tree never leaves this call.
    pub fn parse(&self, html: &str) -> ParsedPage {
        let doc = Html::parse_document(html);

        let mut page = ParsedPage {
            records: Vec::with_capacity(EXPECTED_ROWS_PER_PAGE),
            ..ParsedPage::default()
        };
        for (idx, row) in doc.select(&self.row).enumerate() {
            page.rows_found += 1;
            match self.extractor.extract(row) {
                Extraction::Record(record) => page.records.push(record),
                Extraction::Skip(reason) => {
                    debug!(row = idx + 1, %reason, "skipping row");
                    page.skipped += 1;
                }
            }
        }
        page
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}

/// Text of the first element under `row` matching `selector`, whitespace collapsed.
fn label_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let el = row.select(selector).next()?;
    let text = el.text().collect::<String>();
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Splits `"4.12 avg rating — 1,532,904 ratings"` into `(4.12, 1532904)`.
fn parse_rating(text: &str) -> core::result::Result<(f64, u64), SkipReason> {
    let (rating_part, count_part) = text
        .split_once(RATING_SEPARATOR)
        .ok_or_else(|| SkipReason::MissingSeparator(text.to_string()))?;

    let rating_token = rating_part.split_whitespace().next().unwrap_or_default();
    let avg_rating: f64 = rating_token
        .parse()
        .map_err(|_| SkipReason::BadRating(rating_token.to_string()))?;
    if !(0.0..=MAX_RATING).contains(&avg_rating) {
        return Err(SkipReason::RatingOutOfRange(rating_token.to_string()));
    }

    let count_token = count_part.split_whitespace().next().unwrap_or_default();
    let num_ratings: u64 = count_token
        .replace(',', "")
        .parse()
        .map_err(|_| SkipReason::BadCount(count_token.to_string()))?;

    Ok((avg_rating, num_ratings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_html(title: Option<&str>, author: Option<&str>, rating: Option<&str>) -> String {
        let mut cells = String::new();
        if let Some(title) = title {
            cells.push_str(&format!(
                r#"<a class="bookTitle" itemprop="url" href="/book/show/1"><span itemprop="name" role="heading">{title}</span></a>"#
            ));
        }
        if let Some(author) = author {
            cells.push_str(&format!(
                r#"<span itemprop="author"><a class="authorName" href="/author/1"><span itemprop="name">{author}</span></a></span>"#
            ));
        }
        if let Some(rating) = rating {
            cells.push_str(&format!(
                r#"<span class="greyText smallText uitext"><span class="minirating"><span class="stars staticStars notranslate"><span size="12x12" class="staticStar p10"></span></span> {rating}</span></span>"#
            ));
        }
        format!(
            r#"<tr itemscope itemtype="http://schema.org/Book"><td class="number">1</td><td width="100%" valign="top">{cells}</td></tr>"#
        )
    }

    fn page_html(rows: &[String]) -> String {
        format!(
            "<!doctype html><html><body><table class=\"tableList js-dataTooltip\">{}</table></body></html>",
            rows.concat()
        )
    }

    fn extract_one(row: &str) -> Extraction {
        let doc = Html::parse_document(&page_html(&[row.to_string()]));
        let selector = create_selector(ROW_SELECTOR).unwrap();
        let row = doc.select(&selector).next().expect("row in test markup");
        RowExtractor::new().unwrap().extract(row)
    }

    #[test]
    fn well_formed_row_yields_record() {
        let row = row_html(
            Some("The Hunger Games (The Hunger Games, #1)"),
            Some("Suzanne Collins"),
            Some("4.12 avg rating &mdash; 1,532,904 ratings"),
        );
        let record = extract_one(&row).record().expect("record");
        assert_eq!(record.title, "The Hunger Games (The Hunger Games, #1)");
        assert_eq!(record.author, "Suzanne Collins");
        assert_eq!(record.avg_rating, 4.12);
        assert_eq!(record.num_ratings, 1_532_904);
    }

    #[test]
    fn bare_rating_pair_parses() {
        assert_eq!(parse_rating("4.12 — 1,532,904 ratings"), Ok((4.12, 1_532_904)));
        assert_eq!(parse_rating("0.00 — 0 ratings"), Ok((0.0, 0)));
        assert_eq!(parse_rating("5 — 12 ratings"), Ok((5.0, 12)));
    }

    #[test]
    fn nested_whitespace_is_collapsed() {
        let row = row_html(
            Some("\n   Pride   and\n Prejudice  "),
            Some("  Jane\tAusten "),
            Some("\n 4.29 avg rating \n &mdash; 4,189,101 ratings\n"),
        );
        let record = extract_one(&row).record().expect("record");
        assert_eq!(record.title, "Pride and Prejudice");
        assert_eq!(record.author, "Jane Austen");
        assert_eq!(record.num_ratings, 4_189_101);
    }

    #[test]
    fn missing_labels_are_skipped() {
        let rating = Some("4.12 avg rating &mdash; 10 ratings");
        assert_eq!(
            extract_one(&row_html(None, Some("A"), rating)),
            Extraction::Skip(SkipReason::MissingTitle)
        );
        assert_eq!(
            extract_one(&row_html(Some("T"), None, rating)),
            Extraction::Skip(SkipReason::MissingAuthor)
        );
        assert_eq!(
            extract_one(&row_html(Some("T"), Some("A"), None)),
            Extraction::Skip(SkipReason::MissingRating)
        );
    }

    #[test]
    fn empty_labels_are_skipped() {
        let rating = Some("4.12 avg rating &mdash; 10 ratings");
        assert_eq!(
            extract_one(&row_html(Some("   "), Some("A"), rating)),
            Extraction::Skip(SkipReason::EmptyField("title"))
        );
        assert_eq!(
            extract_one(&row_html(Some("T"), Some(""), rating)),
            Extraction::Skip(SkipReason::EmptyField("author"))
        );
    }

    #[test]
    fn malformed_rating_text_is_skipped() {
        assert!(matches!(
            parse_rating("4.12 avg rating - 1,532,904 ratings"),
            Err(SkipReason::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_rating("really liked it 4.12 avg rating — 10 ratings"),
            Err(SkipReason::BadRating(_))
        ));
        assert!(matches!(parse_rating(" — 10 ratings"), Err(SkipReason::BadRating(_))));
        assert!(matches!(
            parse_rating("4.12 avg rating — many ratings"),
            Err(SkipReason::BadCount(_))
        ));
        assert!(matches!(parse_rating("4.12 avg rating —"), Err(SkipReason::BadCount(_))));
        assert!(matches!(
            parse_rating("4.12 avg rating — -3 ratings"),
            Err(SkipReason::BadCount(_))
        ));
    }

    #[test]
    fn rating_outside_scale_is_skipped() {
        assert!(matches!(
            parse_rating("5.01 — 10 ratings"),
            Err(SkipReason::RatingOutOfRange(_))
        ));
        assert!(matches!(
            parse_rating("-0.5 — 10 ratings"),
            Err(SkipReason::RatingOutOfRange(_))
        ));
        assert!(matches!(
            parse_rating("NaN — 10 ratings"),
            Err(SkipReason::RatingOutOfRange(_))
        ));
        assert!(matches!(
            parse_rating("inf — 10 ratings"),
            Err(SkipReason::RatingOutOfRange(_))
        ));
    }

    #[test]
    fn page_keeps_good_rows_in_order() {
        let rows = [
            row_html(Some("First"), Some("Ann"), Some("4.50 avg rating &mdash; 1,000 ratings")),
            row_html(Some("Second"), Some("Bob"), Some("3.25 avg rating &mdash; 20 ratings")),
            row_html(Some("Broken"), None, Some("4.00 avg rating &mdash; 5 ratings")),
            row_html(Some("Third"), Some("Cy"), Some("4.12 avg rating &mdash; 1,532,904 ratings")),
        ];
        let page = PageParser::new().unwrap().parse(&page_html(&rows));

        assert_eq!(page.rows_found, 4);
        assert_eq!(page.skipped, 1);
        let titles: Vec<_> = page.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
        assert_eq!(page.records[2].avg_rating, 4.12);
        assert_eq!(page.records[2].num_ratings, 1_532_904);
    }

    #[test]
    fn rows_without_book_schema_are_ignored() {
        let html = r#"<html><body><table>
            <tr><td><a class="bookTitle">Ad</a><a class="authorName">Sponsor</a>
            <span class="minirating">4.0 avg rating &mdash; 1 ratings</span></td></tr>
            <tr itemtype="http://schema.org/Movie"><td>Nope</td></tr>
        </table></body></html>"#;
        let page = PageParser::new().unwrap().parse(html);
        assert_eq!(page, ParsedPage::default());
    }

    #[test]
    fn garbage_markup_yields_nothing() {
        let page = PageParser::new().unwrap().parse("<<<not html at all");
        assert_eq!(page.rows_found, 0);
        assert!(page.records.is_empty());
    }
}
