//! The sortable schedule table.

use termine_core::config::LinkReplacement;

use super::escape::escape_wiki;
use super::link::display_name;
use crate::schedule::DisplayEvent;

const TABLE_OPEN: &str = r#"{| class="termine sortable" border="1" cellspacing="0" cellpadding="5" width="100%" style="border-collapse:collapse;""#;

const HEADER: &str = concat!(
    r#"! data-sort-type="date" style="text-align:left; width:250px;" | Datum "#,
    r#"!! style="text-align:left; width: 75px;" | Zeit "#,
    r#"!! style="text-align:left;" | Ort "#,
    r#"!! style="text-align:left;" | Beschreibung"#,
);

/// ## Summary
/// Renders the schedule as a sortable wiki table.
///
/// A non-empty `info` text is placed in an HTML comment before the table.
/// Location keywords are replaced by their configured links after escaping.
#[must_use]
#[tracing::instrument(skip_all, fields(rows = events.len()))]
pub fn render_table(
    events: &[DisplayEvent],
    info: Option<&str>,
    replacements: &[LinkReplacement],
) -> String {
    let mut lines = Vec::with_capacity(events.len() * 2 + 4);

    if let Some(info) = info.filter(|info| !info.is_empty()) {
        lines.push(format!("<!--\n{info}\n-->\n"));
    }

    lines.push(TABLE_OPEN.to_string());
    lines.push(HEADER.to_string());

    for event in events {
        let location = replace_links(
            &escape_wiki(event.location.as_deref().unwrap_or_default()),
            replacements,
        );
        let name = display_name(&event.title, event.link.as_deref());

        lines.push("|-".to_string());
        lines.push(format!(
            "| {} || {} || {location} || {name}",
            date_cell(event),
            time_cell(event)
        ));
    }

    lines.push("|}".to_string());
    lines.join("\n")
}

fn date_cell(event: &DisplayEvent) -> String {
    let date = event.start.format("%d.%m.%Y");
    match &event.description {
        Some(description) => format!("'''{date}'''<br><small>({description})</small>"),
        None => format!("'''{date}'''"),
    }
}

fn time_cell(event: &DisplayEvent) -> String {
    if event.all_day {
        return String::new();
    }
    let start = event.start.format("%H:%M").to_string();
    let end = event.end.format("%H:%M").to_string();
    if end == start {
        start
    } else {
        format!("{start} - {end}")
    }
}

/// Replaces every occurrence of each keyword by its link, in table order.
fn replace_links(text: &str, replacements: &[LinkReplacement]) -> String {
    replacements
        .iter()
        .filter(|r| !r.keyword.is_empty() && !r.link.is_empty())
        .fold(text.to_string(), |text, r| text.replace(&r.keyword, &r.link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn row(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> DisplayEvent {
        DisplayEvent {
            title: title.to_string(),
            start,
            end,
            location: None,
            description: None,
            all_day: false,
            link: None,
        }
    }

    fn replacement(keyword: &str, link: &str) -> LinkReplacement {
        LinkReplacement {
            keyword: keyword.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn empty_schedule() {
        assert_eq!(
            render_table(&[], None, &[]),
            format!("{TABLE_OPEN}\n{HEADER}\n|}}")
        );
    }

    #[test]
    fn info_becomes_comment() {
        let text = render_table(&[], Some("Automatisch erzeugt"), &[]);
        assert!(text.starts_with("<!--\nAutomatisch erzeugt\n-->\n\n{|"));

        let text = render_table(&[], Some(""), &[]);
        assert!(text.starts_with("{|"));
    }

    #[test]
    fn header_names_columns() {
        assert!(HEADER.contains("| Datum !!"));
        assert!(HEADER.ends_with("| Beschreibung"));
    }

    #[test]
    fn recurring_row() {
        let mut event = row("Stammtisch", at(19, 19, 0), at(19, 21, 0));
        event.description = Some("jeden Montag".to_string());
        event.location = Some("Hackspace".to_string());
        event.link = Some("[[Stammtisch]]".to_string());

        let text = render_table(
            &[event],
            None,
            &[replacement("Hackspace", "[[Hackspace]]")],
        );
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[2], "|-");
        assert_eq!(
            lines[3],
            "| '''19.01.2026'''<br><small>(jeden Montag)</small> || 19:00 - 21:00 || [[Hackspace]] || [[Stammtisch|Stammtisch]]"
        );
        assert_eq!(lines[4], "|}");
    }

    #[test]
    fn zero_length_and_all_day_times() {
        let instant = row("Kurz", at(20, 18, 0), at(20, 18, 0));
        let mut all_day = row("Flohmarkt", at(21, 0, 0), at(22, 0, 0));
        all_day.all_day = true;

        let text = render_table(&[instant, all_day], None, &[]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[3], "| '''20.01.2026''' || 18:00 ||  || Kurz");
        assert_eq!(lines[5], "| '''21.01.2026''' ||  ||  || Flohmarkt");
    }

    #[test]
    fn replacements_apply_in_order() {
        let replacements = [
            replacement("Raum", "[[Raum]]"),
            replacement("", "[[Leer]]"),
            replacement("Foyer", ""),
        ];
        assert_eq!(
            replace_links("Raum 1 im Foyer", &replacements),
            "[[Raum]] 1 im Foyer"
        );
    }

    #[test]
    fn location_is_escaped_before_replacement() {
        let mut event = row("Vortrag", at(20, 18, 0), at(20, 20, 0));
        event.location = Some("Saal|Hackspace".to_string());

        let text = render_table(
            &[event],
            None,
            &[replacement("Hackspace", "[[Hackspace|HS]]")],
        );
        assert!(text.contains("|| Saal&#124;[[Hackspace|HS]] ||"));
    }
}
