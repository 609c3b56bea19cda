use std::fmt::Write as _;

use gen3_core::container::CopyStatus;
use gen3_core::core_api::{BoxRecordEntry, CapabilityIssue, Session};
use gen3_core::pk3::PokemonRecord;
use gen3_core::pk3::fields::{Ribbon, Stat};
use gen3_core::regions::BOX_COUNT;
use serde_json::{Map as JsonMap, Value as JsonValue};

const NICKNAME_COL_WIDTH: usize = 12;
const SPECIES_COL_WIDTH: usize = 8;
const PID_COL_WIDTH: usize = 10;
const SHEET_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Adds per-copy status and capability issues.
    pub verbose: bool,
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_record_json(record: &PokemonRecord, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(record_json(record)),
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    render_text_with_options(session, style, TextRenderOptions::default())
}

pub fn render_text_with_options(
    session: &Session,
    style: TextStyle,
    options: TextRenderOptions,
) -> String {
    match style {
        TextStyle::Summary => render_summary_impl(session, options),
    }
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "save_type".to_string(),
        JsonValue::String(snapshot.save_type.as_str().to_string()),
    );
    out.insert(
        "slot".to_string(),
        JsonValue::String(format!("{:?}", snapshot.slot)),
    );
    out.insert("save_index".to_string(), JsonValue::from(snapshot.save_index));
    out.insert("degraded".to_string(), JsonValue::Bool(snapshot.degraded));
    out.insert("primary".to_string(), copy_status_to_json(&snapshot.primary));
    out.insert("backup".to_string(), copy_status_to_json(&snapshot.backup));
    out.insert(
        "trainer".to_string(),
        match &snapshot.trainer {
            Some(trainer) => {
                let mut m = JsonMap::new();
                m.insert("name".to_string(), JsonValue::String(trainer.name.clone()));
                m.insert(
                    "gender".to_string(),
                    JsonValue::String(gender_label(trainer.female).to_string()),
                );
                m.insert("public_id".to_string(), JsonValue::from(trainer.public_id));
                m.insert("secret_id".to_string(), JsonValue::from(trainer.secret_id));
                JsonValue::Object(m)
            }
            None => JsonValue::Null,
        },
    );
    out.insert(
        "current_box".to_string(),
        match snapshot.current_box {
            Some(v) => JsonValue::from(v),
            None => JsonValue::Null,
        },
    );
    out.insert("boxes".to_string(), boxes_to_json(session));
    out.insert(
        "issues".to_string(),
        JsonValue::Array(
            session
                .capabilities()
                .issues
                .iter()
                .map(|issue| JsonValue::String(issue_label(*issue).to_string()))
                .collect(),
        ),
    );

    out
}

fn copy_status_to_json(status: &CopyStatus) -> JsonValue {
    // Reuses the serde form so new variants need no renderer change.
    serde_json::to_value(status).unwrap_or(JsonValue::Null)
}

fn boxes_to_json(session: &Session) -> JsonValue {
    let entries = session.occupied_box_records();
    let mut boxes = Vec::with_capacity(BOX_COUNT);
    for box_index in 0..BOX_COUNT {
        let mut m = JsonMap::new();
        m.insert("index".to_string(), JsonValue::from(box_index));
        m.insert(
            "name".to_string(),
            match session.box_name(box_index) {
                Ok(name) => JsonValue::String(name),
                Err(_) => JsonValue::Null,
            },
        );
        m.insert(
            "records".to_string(),
            JsonValue::Array(
                entries
                    .iter()
                    .filter(|e| e.box_index == box_index)
                    .map(entry_to_json)
                    .collect(),
            ),
        );
        boxes.push(JsonValue::Object(m));
    }
    JsonValue::Array(boxes)
}

fn entry_to_json(entry: &BoxRecordEntry) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("slot".to_string(), JsonValue::from(entry.slot));
    m.insert("pid".to_string(), JsonValue::from(entry.pid));
    m.insert("species".to_string(), JsonValue::from(entry.species));
    m.insert(
        "nickname".to_string(),
        JsonValue::String(entry.nickname.clone()),
    );
    m.insert("egg".to_string(), JsonValue::Bool(entry.is_egg));
    m.insert(
        "checksum_ok".to_string(),
        JsonValue::Bool(entry.checksum_mismatch.is_none()),
    );
    JsonValue::Object(m)
}

fn record_json(record: &PokemonRecord) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    let origins = record.origins();

    out.insert("pid".to_string(), JsonValue::from(record.pid()));
    out.insert("public_id".to_string(), JsonValue::from(record.public_id()));
    out.insert("secret_id".to_string(), JsonValue::from(record.secret_id()));
    out.insert(
        "nickname".to_string(),
        JsonValue::String(record.nickname()),
    );
    out.insert("ot_name".to_string(), JsonValue::String(record.ot_name()));
    out.insert(
        "ot_gender".to_string(),
        JsonValue::String(gender_label(origins.ot_female()).to_string()),
    );
    out.insert("language".to_string(), JsonValue::from(record.language()));
    out.insert("species".to_string(), JsonValue::from(record.species()));
    out.insert("held_item".to_string(), JsonValue::from(record.held_item()));
    out.insert("experience".to_string(), JsonValue::from(record.experience()));
    out.insert("friendship".to_string(), JsonValue::from(record.friendship()));
    out.insert("met_level".to_string(), JsonValue::from(origins.level_met()));
    out.insert(
        "met_location".to_string(),
        JsonValue::from(record.met_location()),
    );
    out.insert("game".to_string(), JsonValue::from(origins.game()));
    out.insert("ball".to_string(), JsonValue::from(origins.ball()));
    out.insert("egg".to_string(), JsonValue::Bool(record.is_egg()));
    out.insert(
        "ability_flag".to_string(),
        JsonValue::Bool(record.ability_flag()),
    );
    out.insert(
        "moves".to_string(),
        JsonValue::Array(
            record
                .moves()
                .iter()
                .zip(record.move_pp())
                .enumerate()
                .map(|(i, (id, pp))| {
                    let mut m = JsonMap::new();
                    m.insert("id".to_string(), JsonValue::from(*id));
                    m.insert("pp".to_string(), JsonValue::from(pp));
                    let pp_ups = record.pp_ups().get(i).map_or(JsonValue::Null, JsonValue::from);
                    m.insert("pp_ups".to_string(), pp_ups);
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    out.insert("ivs".to_string(), stats_to_json(|stat| record.iv(stat)));
    let evs = record.evs();
    out.insert("evs".to_string(), stats_to_json(|stat| evs.get(stat)));
    out.insert(
        "ribbons".to_string(),
        JsonValue::Array(
            record
                .ribbons()
                .earned()
                .into_iter()
                .map(|r: Ribbon| JsonValue::String(format!("{r:?}")))
                .collect(),
        ),
    );
    out.insert(
        "checksum".to_string(),
        JsonValue::from(record.stored_checksum()),
    );
    out.insert(
        "checksum_ok".to_string(),
        JsonValue::Bool(record.checksum_mismatch().is_none()),
    );

    out
}

fn stats_to_json(value: impl Fn(Stat) -> u8) -> JsonValue {
    let mut m = JsonMap::new();
    for stat in Stat::ALL {
        m.insert(stat.as_str().to_string(), JsonValue::from(value(stat)));
    }
    JsonValue::Object(m)
}

fn render_summary_impl(session: &Session, options: TextRenderOptions) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();

    writeln!(&mut out, "{}", centered_no_trailing("GEN III SAVE", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing(
            &format!(
                "{} / {:?} slot / index {}",
                snapshot.save_type, snapshot.slot, snapshot.save_index
            ),
            SHEET_WIDTH
        )
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    match &snapshot.trainer {
        Some(trainer) => writeln!(
            &mut out,
            "  Trainer: {:<10} Gender: {:<7} ID: {:05}",
            trainer.name,
            gender_label(trainer.female),
            trainer.public_id
        )
        .expect("writing to String cannot fail"),
        None => {
            writeln!(&mut out, "  Trainer: unavailable").expect("writing to String cannot fail")
        }
    }
    if let Some(current_box) = snapshot.current_box {
        writeln!(
            &mut out,
            "  Current box: {:<4} Occupied slots: {}",
            current_box + 1,
            snapshot.occupied_box_slots
        )
        .expect("writing to String cannot fail");
    }

    if options.verbose {
        writeln!(&mut out).expect("writing to String cannot fail");
        writeln!(&mut out, "  Primary: {}", describe_copy(&snapshot.primary))
            .expect("writing to String cannot fail");
        writeln!(&mut out, "  Backup:  {}", describe_copy(&snapshot.backup))
            .expect("writing to String cannot fail");
        for issue in &session.capabilities().issues {
            writeln!(&mut out, "  Issue:   {}", issue_label(*issue))
                .expect("writing to String cannot fail");
        }
    }

    let entries = session.occupied_box_records();
    for box_index in 0..BOX_COUNT {
        let in_box: Vec<&BoxRecordEntry> =
            entries.iter().filter(|e| e.box_index == box_index).collect();
        if in_box.is_empty() {
            continue;
        }
        let name = session
            .box_name(box_index)
            .unwrap_or_else(|_| format!("BOX {}", box_index + 1));
        writeln!(&mut out).expect("writing to String cannot fail");
        writeln!(&mut out, "  ::: {} :::", name).expect("writing to String cannot fail");
        for entry in in_box {
            write_entry_line(&mut out, entry);
        }
    }

    out
}

fn write_entry_line(out: &mut String, entry: &BoxRecordEntry) {
    let nickname = if entry.is_egg {
        "(egg)".to_string()
    } else {
        fit_column(&entry.nickname, NICKNAME_COL_WIDTH)
    };
    let line = format!(
        "  {:>2}  {:<nw$} #{:<sw$} {:0>pw$X} {}",
        entry.slot + 1,
        nickname,
        entry.species,
        entry.pid,
        if entry.checksum_mismatch.is_some() {
            "BAD CHECKSUM"
        } else {
            ""
        },
        nw = NICKNAME_COL_WIDTH,
        sw = SPECIES_COL_WIDTH,
        pw = PID_COL_WIDTH - 2,
    );
    writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
}

fn describe_copy(status: &CopyStatus) -> String {
    match status {
        CopyStatus::Valid {
            save_type,
            save_index,
        } => format!("valid {save_type}, index {save_index}"),
        CopyStatus::Empty => "empty".to_string(),
        CopyStatus::BadSignature { physical_sector } => {
            format!("bad signature in sector {physical_sector}")
        }
        CopyStatus::BadSectorIds => "duplicate or missing sector ids".to_string(),
        CopyStatus::InconsistentSaveIndex => "inconsistent save index".to_string(),
        CopyStatus::UnrecognizedVariant { save_index } => {
            format!("unrecognized variant, index {save_index}")
        }
        CopyStatus::ChecksumMismatch {
            sector_id,
            save_index,
        } => format!("checksum mismatch in sector {sector_id}, index {save_index}"),
    }
}

fn issue_label(issue: CapabilityIssue) -> &'static str {
    match issue {
        CapabilityIssue::DegradedLayout => "degraded_layout",
        CapabilityIssue::PrimaryCopyInvalid => "primary_copy_invalid",
        CapabilityIssue::BackupCopyInvalid => "backup_copy_invalid",
    }
}

fn gender_label(female: bool) -> &'static str {
    if female { "female" } else { "male" }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}
