// CL2 wire-format parser. Each line of the interchange format starts with a
// 2-character record-type code; result lines (D0) are fixed-width columns.
// The parser keeps its "where am I" context (current meet, club, swimmer) in
// an explicit state struct and feeds typed records into the directory.
//
// Files are historically messy: short lines, blank columns, and invalid
// codes are all survivable. Anything dropped lands in the quality report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::directory::{Directory, ResolveError};
use crate::entities::SwimmerId;
use crate::identity::{decode_legacy_birthday, is_legacy_id};
use crate::quality::{IssueKind, QualityIssue, Severity};
use crate::record::SwimRecord;
use crate::sdif::{Course, Event, Session, Sex, Stroke};
use crate::stime::Time;

/// Result strings that mean "no time swum".
const IGNORED_RESULTS: &[&str] = &["NT", "NS", "DNF", "DQ", "SCR"];

// ============================================================================
// PARSE STATE
// ============================================================================

#[derive(Debug, Default, Clone)]
struct MeetInfo {
    name: String,
    #[allow(dead_code)]
    start_date: Option<NaiveDate>,
}

/// Parser context, reset at file boundaries and Z0 terminator lines.
#[derive(Debug, Default)]
pub struct Cl2Parser {
    meet: Option<MeetInfo>,
    /// (team code, LSC code) of the club the following results belong to.
    /// None while inside an unattached block.
    current_club: Option<(String, Option<String>)>,
    /// Swimmer the most recent result line resolved to; D3 lines attach
    /// long-form ids to this swimmer.
    current_swimmer: Option<SwimmerId>,
    current_file: Option<String>,
}

impl Cl2Parser {
    pub fn new() -> Cl2Parser {
        Cl2Parser::default()
    }

    /// Parse one .cl2 file into the directory. Returns the number of result
    /// lines seen (not all of them necessarily ingest cleanly).
    pub fn read_file(&mut self, directory: &mut Directory, path: &Path) -> Result<usize> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        self.reset();
        self.current_file = Some(path.display().to_string());

        let mut result_lines = 0;
        for (index, line) in contents.lines().enumerate() {
            let line_number = index + 1;
            match line.get(0..2) {
                Some("B1") => self.process_b1(line),
                Some("C1") => self.process_c1(directory, line),
                Some("D0") => {
                    result_lines += 1;
                    self.process_d0(directory, line, line_number);
                }
                Some("D3") => self.process_d3(directory, line),
                Some("Z0") => self.reset(),
                // A0/B2/C2/D1/D2/E0/F0/G0 and anything else: not modeled.
                _ => {}
            }
        }
        debug!(file = %path.display(), result_lines, "parsed file");
        Ok(result_lines)
    }

    fn reset(&mut self) {
        self.meet = None;
        self.current_club = None;
        self.current_swimmer = None;
    }

    // ------------------------------------------------------------------
    // Line handlers
    // ------------------------------------------------------------------

    /// Meet description line.
    fn process_b1(&mut self, line: &str) {
        let name = field(line, 11, 41).to_string();
        let start_date = parse_mmddyyyy(field(line, 121, 129));
        self.meet = Some(MeetInfo { name, start_date });
    }

    /// Club description line. Unattached blocks clear the current club so
    /// the following results carry no team affiliation.
    fn process_c1(&mut self, directory: &mut Directory, line: &str) {
        let lsc_code = field(line, 11, 13);
        let team_code = field(line, 13, 17);
        let full_name = field(line, 17, 47);

        let unattached = lsc_code == "UN"
            || full_name.to_lowercase().contains("unattached")
            || (team_code.to_uppercase().contains("UN")
                && full_name.to_lowercase().contains("unat"));
        if unattached || team_code.is_empty() {
            self.current_club = None;
            return;
        }

        let lsc = (!lsc_code.is_empty()).then(|| lsc_code.to_string());
        directory.register_club(team_code, lsc.as_deref(), Some(full_name));
        self.current_club = Some((team_code.to_string(), lsc));
    }

    /// Individual result line: up to three records (prelims, swim-off,
    /// finals), one per populated time column.
    fn process_d0(&mut self, directory: &mut Directory, line: &str, line_number: usize) {
        let parsed = match self.parse_d0(line) {
            Some(parsed) => parsed,
            None => {
                directory.quality_mut().push(QualityIssue {
                    kind: IssueKind::UnparsableLine,
                    severity: Severity::Critical,
                    message: "result line missing mandatory fields".to_string(),
                    source_file: self.current_file.clone(),
                    line_number: Some(line_number),
                });
                return;
            }
        };

        for record in parsed {
            match directory.ingest(&record) {
                Ok(id) => self.current_swimmer = Some(id),
                Err(err) => {
                    let kind = match err {
                        ResolveError::MalformedIdentifier { .. } => IssueKind::MalformedIdentifier,
                        ResolveError::Ambiguous { .. } => IssueKind::AmbiguousIdentity,
                    };
                    directory.quality_mut().push(QualityIssue {
                        kind,
                        severity: Severity::Critical,
                        message: err.to_string(),
                        source_file: self.current_file.clone(),
                        line_number: Some(line_number),
                    });
                }
            }
        }
    }

    /// Supplemental swimmer line carrying the long-form id.
    fn process_d3(&mut self, directory: &mut Directory, line: &str) {
        let long_id = field(line, 2, 16);
        if long_id.len() == 14 {
            if let Some(swimmer) = self.current_swimmer {
                directory.attach_long_id(swimmer, long_id);
            }
        }
    }

    fn parse_d0(&self, line: &str) -> Option<Vec<SwimRecord>> {
        let full_name = field(line, 11, 39);
        let short_id = field(line, 39, 51).to_string();
        let birth_month = field(line, 55, 57);
        let birth_day = field(line, 57, 59);
        let birth_year = field(line, 59, 63);
        let age_class = field(line, 63, 65).to_string();
        let sex = Sex::from_code(field(line, 65, 66)).ok()?;
        let distance: u32 = field(line, 67, 71).parse().ok()?;
        let stroke = Stroke::from_code(field(line, 71, 72)).ok()?;
        let swim_date = parse_mmdd_yyyy_cols(
            field(line, 80, 82),
            field(line, 82, 84),
            field(line, 84, 88),
        )?;

        // Relay results arrive in their own record types; a relay stroke on
        // an individual line carries no per-swimmer event.
        if stroke.is_relay() {
            return Some(Vec::new());
        }

        let (first_name, last_name, mut middle_initial) = split_name(full_name)?;

        // Birthday: straight from the line when present, otherwise decoded
        // from a birthdate-derived id when the swimmer carries one.
        let birthday = if !birth_month.is_empty() && !birth_day.is_empty() && !birth_year.is_empty()
        {
            NaiveDate::from_ymd_opt(
                birth_year.parse().ok()?,
                birth_month.parse().ok()?,
                birth_day.parse().ok()?,
            )
        } else if is_legacy_id(&first_name, &last_name, middle_initial, &short_id) {
            if middle_initial.is_none() {
                let ninth = short_id.as_bytes().get(9).copied().map(char::from);
                if let Some(c) = ninth.filter(|c| c.is_ascii_alphabetic()) {
                    middle_initial = Some(c);
                }
            }
            decode_legacy_birthday(&short_id, swim_date.year())
        } else {
            None
        };

        let seed_time = parse_time_column(field(line, 88, 96));
        let meet_name = self
            .meet
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_default();
        let (team_code, lsc_code) = match &self.current_club {
            Some((team, lsc)) => (Some(team.clone()), lsc.clone()),
            None => (None, None),
        };

        // (session, time column, course column, place column, points column)
        let sessions: [(Session, (usize, usize), usize, Option<(usize, usize)>, Option<(usize, usize)>); 3] = [
            (Session::Prelims, (97, 105), 105, Some((132, 135)), None),
            (Session::SwimOff, (106, 114), 114, None, None),
            (Session::Finals, (115, 123), 123, Some((135, 138)), Some((138, 142))),
        ];

        let mut records = Vec::new();
        for (session, (time_start, time_end), course_col, place_cols, points_cols) in sessions {
            let time_text = field(line, time_start, time_end);
            let final_time = match parse_time_column(time_text) {
                Some(time) => time,
                None => continue,
            };
            let course = match Course::from_code(field(line, course_col, course_col + 1)) {
                Ok(course) => course,
                Err(_) => continue,
            };
            let event = match Event::new(distance, stroke, course) {
                Ok(event) => event,
                Err(_) => continue,
            };
            let rank = place_cols
                .and_then(|(start, end)| field(line, start, end).parse::<i32>().ok())
                .filter(|place| *place > 0)
                .map(|place| place as u32);
            let points =
                points_cols.and_then(|(start, end)| field(line, start, end).parse::<f64>().ok());

            records.push(SwimRecord {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                middle_initial,
                sex,
                short_id: short_id.clone(),
                long_id: None,
                birthday,
                age_class: age_class.clone(),
                event,
                session,
                swim_date,
                final_time,
                seed_time,
                rank,
                points,
                team_code: team_code.clone(),
                lsc_code: lsc_code.clone(),
                meet_name: meet_name.clone(),
            });
        }
        Some(records)
    }
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

/// Trimmed column slice; empty when the line is too short.
fn field(line: &str, start: usize, end: usize) -> &str {
    if start >= line.len() {
        return "";
    }
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_time_column(text: &str) -> Option<Time> {
    if text.is_empty() || IGNORED_RESULTS.contains(&text) {
        return None;
    }
    text.parse::<Time>().ok()
}

/// Dates in B1 lines are MMDDYYYY in one column.
fn parse_mmddyyyy(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 {
        return None;
    }
    parse_mmdd_yyyy_cols(&text[0..2], &text[2..4], &text[4..8])
}

fn parse_mmdd_yyyy_cols(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// "Last, First M" with an optional trailing middle initial.
fn split_name(full_name: &str) -> Option<(String, String, Option<char>)> {
    let mut name = full_name.trim();
    let mut middle_initial = None;
    let bytes = name.as_bytes();
    if bytes.len() >= 2
        && bytes[bytes.len() - 2] == b' '
        && bytes[bytes.len() - 1].is_ascii_uppercase()
    {
        middle_initial = Some(bytes[bytes.len() - 1] as char);
        name = name[..name.len() - 2].trim_end();
    }
    let (last, first) = name.split_once(',')?;
    let last = title_case(last.trim());
    let first = title_case(first.trim());
    if first.is_empty() || last.is_empty() {
        return None;
    }
    Some((first, last, middle_initial))
}

/// Uppercase wire-format names rendered for humans: first letter of each
/// alphabetic run capitalized, the rest lowered.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start_of_word = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Parse every .cl2 file under `root` (recursively) into the directory,
/// then run the short-id reconciliation pass. Returns the number of files
/// read.
pub fn read_cl2_dir(directory: &mut Directory, root: &Path) -> Result<usize> {
    let mut paths = Vec::new();
    collect_cl2_paths(root, &mut paths)?;
    paths.sort();

    let mut parser = Cl2Parser::new();
    for path in &paths {
        parser.read_file(directory, path)?;
    }
    let merges = directory.reconcile_short_ids();
    info!(
        files = paths.len(),
        merges,
        swimmers = directory.swimmer_count(),
        "ingestion complete"
    );
    Ok(paths.len())
}

fn collect_cl2_paths(root: &Path, paths: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in fs::read_dir(root).with_context(|| format!("listing {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_cl2_paths(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "cl2") {
            paths.push(path);
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("YOUNG, CY V"),
            Some(("Cy".to_string(), "Young".to_string(), Some('V')))
        );
        assert_eq!(
            split_name("CHU, THOMAS"),
            Some(("Thomas".to_string(), "Chu".to_string(), None))
        );
        assert_eq!(split_name("NOCOMMA"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("YOUNG"), "Young");
        assert_eq!(title_case("O'NEIL"), "O'Neil");
        assert_eq!(title_case("VAN DER BERG"), "Van Der Berg");
    }

    #[test]
    fn test_field_tolerates_short_lines() {
        assert_eq!(field("D0", 11, 39), "");
        assert_eq!(field("D0abcdef", 2, 5), "abc");
    }

    #[test]
    fn test_parse_mmddyyyy() {
        assert_eq!(
            parse_mmddyyyy("06012025"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(parse_mmddyyyy("0601202"), None);
        assert_eq!(parse_mmddyyyy("13412025"), None);
    }

    /// A D0 line laid out column by column, the way meet software emits it.
    fn d0_line(
        name: &str,
        short_id: &str,
        birthday: &str, // "MMDDYYYY" or ""
        age_class: &str,
        sex: &str,
        distance: &str,
        stroke: &str,
        swim_date: &str, // "MMDDYYYY"
        finals_time: &str,
        finals_course: &str,
    ) -> String {
        let mut line = " ".repeat(160);
        let mut put = |start: usize, text: &str| {
            line.replace_range(start..start + text.len(), text);
        };
        put(0, "D0");
        put(11, name);
        put(39, short_id);
        if birthday.len() == 8 {
            put(55, &birthday[0..2]);
            put(57, &birthday[2..4]);
            put(59, &birthday[4..8]);
        }
        put(63, age_class);
        put(65, sex);
        put(66, sex);
        put(67, &format!("{:>4}", distance));
        put(71, stroke);
        put(80, &swim_date[0..2]);
        put(82, &swim_date[2..4]);
        put(84, &swim_date[4..8]);
        put(115, &format!("{:>8}", finals_time));
        put(123, finals_course);
        line
    }

    #[test]
    fn test_d0_finals_record() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        let line = d0_line(
            "YOUNG, CY V",
            "091879CY*VYO",
            "09181979",
            "45",
            "M",
            "50",
            "1",
            "06012025",
            "28.10",
            "Y",
        );
        parser.process_d0(&mut directory, &line, 1);

        assert_eq!(directory.swimmer_count(), 1);
        let swimmer = directory.swimmers().next().unwrap();
        assert_eq!(swimmer.first_name, "Cy");
        assert_eq!(swimmer.last_name, "Young");
        assert_eq!(swimmer.middle_initial, Some('V'));
        assert_eq!(
            swimmer.birthday.exact(),
            NaiveDate::from_ymd_opt(1979, 9, 18)
        );
        assert_eq!(swimmer.performance_count(), 1);
    }

    #[test]
    fn test_d0_birthday_recovered_from_legacy_id() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        // No birthday columns, but the short id is a legacy encoding.
        let line = d0_line(
            "YOUNG, CY",
            "091879CY*VYO",
            "",
            "45",
            "M",
            "50",
            "1",
            "06012025",
            "28.10",
            "Y",
        );
        parser.process_d0(&mut directory, &line, 1);

        let swimmer = directory.swimmers().next().unwrap();
        assert_eq!(
            swimmer.birthday.exact(),
            NaiveDate::from_ymd_opt(1979, 9, 18)
        );
        // The middle initial rides along in the id.
        assert_eq!(swimmer.middle_initial, Some('V'));
    }

    #[test]
    fn test_d0_one_record_per_session_column() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        let mut line = d0_line(
            "YOUNG, CY V",
            "091879CY*VYO",
            "09181979",
            "45",
            "M",
            "100",
            "2",
            "06012025",
            "1:02.50",
            "Y",
        );
        // Prelim columns populated as well: two records from one line.
        line.replace_range(97..105, " 1:04.10");
        line.replace_range(105..106, "Y");
        line.replace_range(132..135, "  3");
        parser.process_d0(&mut directory, &line, 1);

        assert_eq!(directory.swimmer_count(), 1);
        let swimmer = directory.swimmers().next().unwrap();
        assert_eq!(swimmer.performance_count(), 2);

        let event = Event::new(100, Stroke::Backstroke, Course::Scy).unwrap();
        let results = swimmer.performances(event);
        let sessions: Vec<Session> = results.iter().map(|p| p.session).collect();
        assert!(sessions.contains(&Session::Prelims));
        assert!(sessions.contains(&Session::Finals));
        // Best time is the finals swim.
        assert_eq!(
            swimmer.best_time(event),
            Some("1:02.50".parse().unwrap())
        );
        let prelim = results
            .iter()
            .find(|p| p.session == Session::Prelims)
            .unwrap();
        assert_eq!(prelim.rank, Some(3));
    }

    #[test]
    fn test_d0_ignored_result_strings() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        let line = d0_line(
            "YOUNG, CY V",
            "091879CY*VYO",
            "09181979",
            "45",
            "M",
            "50",
            "1",
            "06012025",
            "DQ",
            "Y",
        );
        parser.process_d0(&mut directory, &line, 1);
        assert_eq!(directory.swimmer_count(), 0);
        assert_eq!(directory.quality().records_ingested, 0);
    }

    #[test]
    fn test_d0_short_line_reported() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        parser.process_d0(&mut directory, "D0 garbage", 7);
        assert_eq!(directory.quality().count(IssueKind::UnparsableLine), 1);
        assert_eq!(directory.quality().issues[0].line_number, Some(7));
    }

    #[test]
    fn test_d3_attaches_long_id() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();
        let line = d0_line(
            "YOUNG, CY V",
            "091879CY*VYO",
            "09181979",
            "45",
            "M",
            "50",
            "1",
            "06012025",
            "28.10",
            "Y",
        );
        parser.process_d0(&mut directory, &line, 1);
        parser.process_d3(&mut directory, "D3AB12CD34EF56GH  ");

        let swimmer = directory.swimmers().next().unwrap();
        assert_eq!(swimmer.long_id.as_deref(), Some("AB12CD34EF56GH"));
    }

    #[test]
    fn test_c1_unattached_clears_club() {
        let mut directory = Directory::new();
        let mut parser = Cl2Parser::new();

        let mut club_line = " ".repeat(60);
        club_line.replace_range(0..2, "C1");
        club_line.replace_range(11..13, "PC");
        club_line.replace_range(13..17, "PCSC");
        club_line.replace_range(17..34, "Pacific Swim Club");
        parser.process_c1(&mut directory, &club_line);
        assert_eq!(
            parser.current_club,
            Some(("PCSC".to_string(), Some("PC".to_string())))
        );
        assert_eq!(
            directory.find_club("PCSC").unwrap().name,
            "Pacific Swim Club"
        );

        let mut unattached = " ".repeat(60);
        unattached.replace_range(0..2, "C1");
        unattached.replace_range(11..13, "UN");
        unattached.replace_range(13..17, "UN01");
        unattached.replace_range(17..27, "Unattached");
        parser.process_c1(&mut directory, &unattached);
        assert_eq!(parser.current_club, None);
    }
}
