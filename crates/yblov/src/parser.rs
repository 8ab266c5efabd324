use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::{MunicipalityRef, PartyVotes, SummaryCounts};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Page layout mismatch: {0}")]
    PageShape(String),
    #[error("Expected a number, got '{0}'")]
    InvalidNumber(String),
}

static SEL_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));

static SEL_SUMMARY_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#ps311_t1").expect("invalid selector: summary table"));

static SEL_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));

static SEL_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: td"));

static SEL_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: a"));

static SEL_PARTY_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.overflow_name").expect("invalid selector: party name"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Strips regular and non-breaking spaces from a numeric cell,
/// e.g. "103\u{a0}512" -> "103512".
fn clean_number(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_count(cell: ElementRef) -> Result<u64, ParseError> {
    let cleaned = clean_number(&elem_text(cell));
    cleaned.parse().map_err(|_| ParseError::InvalidNumber(cleaned))
}

/// Lists the municipalities linked from an index page, in document order.
///
/// The first two rows of the results table are headers; every remaining
/// row whose first cell links to a detail page names one municipality.
/// Rows without such a link (region headings, spacers) are skipped.
pub fn parse_municipality_list(html: &str, base_url: &str) -> Vec<MunicipalityRef> {
    let document = Html::parse_document(html);

    let mut municipalities = Vec::new();
    for row in document.select(&SEL_TR).skip(2) {
        let cells: Vec<ElementRef> = row.select(&SEL_TD).collect();
        if cells.len() < 2 {
            continue;
        }
        let Some(anchor) = cells[0].select(&SEL_ANCHOR).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        municipalities.push(MunicipalityRef {
            code: elem_text(anchor).trim().to_string(),
            name: elem_text(cells[1]).trim().to_string(),
            detail_url: format!("{}{}", base_url, href),
        });
    }
    municipalities
}

/// Reads the three headline counts from their fixed positions in the
/// `ps311_t1` overview table: first data row after two header rows,
/// cells 3, 4 and 7.
///
/// Any deviation from the expected layout is reported as a typed error
/// rather than papered over with empty values.
pub fn parse_summary(html: &str) -> Result<SummaryCounts, ParseError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&SEL_SUMMARY_TABLE)
        .next()
        .ok_or_else(|| ParseError::PageShape("summary table ps311_t1 not found".to_string()))?;

    let row = table
        .select(&SEL_TR)
        .nth(2)
        .ok_or_else(|| ParseError::PageShape("summary table has no data row".to_string()))?;

    let cells: Vec<ElementRef> = row.select(&SEL_TD).collect();
    let cell = |index: usize| {
        cells
            .get(index)
            .copied()
            .ok_or_else(|| ParseError::PageShape(format!("summary row has no cell {index}")))
    };

    Ok(SummaryCounts {
        registered: parse_count(cell(3)?)?,
        envelopes: parse_count(cell(4)?)?,
        valid: parse_count(cell(7)?)?,
    })
}

/// Collects party vote counts from every table on a detail page.
///
/// A row qualifies when it has at least three cells and one of them
/// carries the site's `overflow_name` class marking the party name; the
/// vote count is the third cell. Rows whose cleaned vote text is not all
/// digits (placeholder dashes for parties without a result) are dropped.
pub fn parse_party_votes(html: &str) -> PartyVotes {
    let document = Html::parse_document(html);

    let mut votes = PartyVotes::default();
    for table in document.select(&SEL_TABLE) {
        for row in table.select(&SEL_TR) {
            let cells: Vec<ElementRef> = row.select(&SEL_TD).collect();
            if cells.len() < 3 {
                continue;
            }
            let Some(name_cell) = row.select(&SEL_PARTY_NAME).next() else {
                continue;
            };
            let name = elem_text(name_cell).trim().to_string();
            let count = clean_number(&elem_text(cells[2]));
            if name.is_empty() || count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if let Ok(count) = count.parse() {
                votes.insert(name, count);
            }
        }
    }
    votes
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PAGE: &str = r#"
        <table>
            <tr><th>Obec</th><th>Nazev</th></tr>
            <tr><th>kod</th><th>nazev</th></tr>
            <tr>
                <td><a href="ps311?xjazyk=CZ&amp;xobec=529303">529303</a></td>
                <td>Benesov</td>
                <td><a href="ps311?xjazyk=CZ&amp;xobec=529303">X</a></td>
            </tr>
            <tr>
                <td>Vysledky za okres</td>
                <td>souhrn</td>
                <td>-</td>
            </tr>
            <tr>
                <td><a href="ps311?xjazyk=CZ&amp;xobec=532568">532568</a></td>
                <td>Bernartice</td>
                <td><a href="ps311?xjazyk=CZ&amp;xobec=532568">X</a></td>
            </tr>
        </table>
    "#;

    const DETAIL_PAGE: &str = r#"
        <table id="ps311_t1">
            <tr><th colspan="9">Okrsky</th></tr>
            <tr><th>p</th><th>z</th><th>u</th><th>v</th><th>o</th><th>u</th><th>o</th><th>p</th><th>h</th></tr>
            <tr>
                <td>1</td><td>1</td><td>100,00</td>
                <td>103&nbsp;512</td><td>52 277</td><td>64,95</td>
                <td>51&nbsp;900</td><td>51&nbsp;666</td><td>99,54</td>
            </tr>
        </table>
        <table>
            <tr><th>c</th><th>strana</th><th>hlasy</th><th>pct</th></tr>
            <tr><td>1</td><td class="overflow_name">PartyA</td><td>1&nbsp;500</td><td>2,90</td></tr>
            <tr><td>2</td><td class="overflow_name">PartyB</td><td>20</td><td>0,03</td></tr>
            <tr><td colspan="4">mezisoucet</td></tr>
        </table>
        <table>
            <tr><th>c</th><th>strana</th><th>hlasy</th><th>pct</th></tr>
            <tr><td>3</td><td class="overflow_name">PartyC</td><td>7</td><td>0,01</td></tr>
            <tr><td>4</td><td class="overflow_name">PartyD</td><td>-</td><td>-</td></tr>
        </table>
    "#;

    #[test]
    fn municipality_list_skips_headers_and_linkless_rows() {
        let list = parse_municipality_list(INDEX_PAGE, "https://results.test/pls/");

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].code, "529303");
        assert_eq!(list[0].name, "Benesov");
        assert_eq!(
            list[0].detail_url,
            "https://results.test/pls/ps311?xjazyk=CZ&xobec=529303"
        );
        assert_eq!(list[1].code, "532568");
        assert_eq!(list[1].name, "Bernartice");
    }

    #[test]
    fn municipality_list_empty_on_unrelated_page() {
        let list = parse_municipality_list("<html><body><p>nothing</p></body></html>", "base/");
        assert!(list.is_empty());
    }

    #[test]
    fn summary_reads_fixed_cells_with_spaces_removed() {
        let summary = parse_summary(DETAIL_PAGE).unwrap();

        assert_eq!(summary.registered, 103512);
        assert_eq!(summary.envelopes, 52277);
        assert_eq!(summary.valid, 51666);
    }

    #[test]
    fn summary_missing_table_is_page_shape_error() {
        let err = parse_summary("<table><tr><td>1</td></tr></table>").unwrap_err();
        assert!(matches!(err, ParseError::PageShape(_)));
    }

    #[test]
    fn summary_short_row_is_page_shape_error() {
        let html = r#"
            <table id="ps311_t1">
                <tr><th>a</th></tr>
                <tr><th>b</th></tr>
                <tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td></tr>
            </table>
        "#;
        let err = parse_summary(html).unwrap_err();
        assert!(matches!(err, ParseError::PageShape(_)));
    }

    #[test]
    fn summary_non_numeric_cell_is_invalid_number() {
        let html = r#"
            <table id="ps311_t1">
                <tr><th>a</th></tr>
                <tr><th>b</th></tr>
                <tr>
                    <td>1</td><td>2</td><td>3</td>
                    <td>n/a</td><td>5</td><td>6</td><td>7</td><td>8</td>
                </tr>
            </table>
        "#;
        let err = parse_summary(html).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber(ref s) if s == "n/a"));
    }

    #[test]
    fn party_votes_in_document_order_across_tables() {
        let votes = parse_party_votes(DETAIL_PAGE);

        assert_eq!(
            votes.names().collect::<Vec<_>>(),
            vec!["PartyA", "PartyB", "PartyC"]
        );
        assert_eq!(votes.get("PartyA"), Some(1500));
        assert_eq!(votes.get("PartyB"), Some(20));
        assert_eq!(votes.get("PartyC"), Some(7));
    }

    #[test]
    fn party_with_dash_votes_is_excluded() {
        let votes = parse_party_votes(DETAIL_PAGE);
        assert_eq!(votes.get("PartyD"), None);
    }

    #[test]
    fn clean_number_strips_nbsp_and_spaces() {
        assert_eq!(clean_number("103\u{a0}512"), "103512");
        assert_eq!(clean_number(" 52 277 "), "52277");
        assert_eq!(clean_number("7"), "7");
    }
}
