use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde_json::Value;

use crate::models::{BorrowerRecord, BorrowerStatus, EnrollmentRecord, RequestStatus};

// ---------------------------------------------------------------------------
// Low-level coercion helpers
// ---------------------------------------------------------------------------

/// Strip everything but ASCII digits.
pub fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Render a JSON scalar the way the backend's loose typing expects:
/// strings pass through, numbers drop a trailing `.0`, null becomes empty.
fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Probe `raw` for the first present, non-null key from `keys`.
fn first_present<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = raw.as_object()?;
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

fn probe(raw: &Value, keys: &[&str]) -> String {
    first_present(raw, keys).map(scalar_to_string).unwrap_or_default()
}

/// Flag coercion: {yes,y,true,1} -> "Y", {no,n,false,0} -> "N",
/// already-uppercase Y/N pass through, anything else -> "".
pub fn to_yn(v: &str) -> String {
    match v.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => "Y".to_string(),
        "no" | "n" | "false" | "0" => "N".to_string(),
        _ => {
            let up = v.trim().to_uppercase();
            if up == "Y" || up == "N" {
                up
            } else {
                String::new()
            }
        }
    }
}

/// Outbound flag form: Y -> "Yes", N -> "No", unknown -> "".
pub fn to_yes_no(v: &str) -> String {
    match v.trim().to_uppercase().as_str() {
        "Y" | "YES" | "TRUE" | "1" => "Yes".to_string(),
        "N" | "NO" | "FALSE" | "0" => "No".to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

fn two_digit_year(yy: u32) -> i32 {
    // Pivot: >= 50 lands in the 1900s.
    if yy >= 50 {
        1900 + yy as i32
    } else {
        2000 + yy as i32
    }
}

/// Coerce a date-like string into `MM/DD/YYYY`.
///
/// Accepts `MM/DD/YYYY` (returned as-is), `MM/DD/YY`, `YYYY-MM-DD` with or
/// without a time suffix, and raw 6- or 8-digit strings. Anything that fails
/// every branch passes through unchanged; this function never errors.
pub fn us_date(value: &str) -> String {
    let s = value.trim();
    if s.is_empty() {
        return String::new();
    }

    static MDYYYY: OnceLock<Regex> = OnceLock::new();
    static MDYY: OnceLock<Regex> = OnceLock::new();
    static YMD: OnceLock<Regex> = OnceLock::new();
    let mdyyyy = MDYYYY.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
    let mdyy = MDYY.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap());
    let ymd = YMD.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").unwrap());

    if let Some(c) = mdyyyy.captures(s) {
        return format!("{:0>2}/{:0>2}/{}", &c[1], &c[2], &c[3]);
    }
    if let Some(c) = mdyy.captures(s) {
        let year = two_digit_year(c[3].parse().unwrap_or(0));
        return format!("{:0>2}/{:0>2}/{year}", &c[1], &c[2]);
    }
    if let Some(c) = ymd.captures(s) {
        return format!("{:0>2}/{:0>2}/{}", &c[2], &c[3], &c[1]);
    }

    // Generic digit fallback: MMDDYY or MMDDYYYY.
    let d = digits(s);
    if d.len() == 6 {
        let year = two_digit_year(d[4..6].parse().unwrap_or(0));
        return format!("{}/{}/{year}", &d[0..2], &d[2..4]);
    }
    if d.len() >= 8 {
        return format!("{}/{}/{}", &d[0..2], &d[2..4], &d[4..8]);
    }

    s.to_string()
}

/// Parse `MM/DD/YYYY`, optionally followed by `HH:MM[:SS] [AM|PM]`.
/// ISO strings are accepted as a fallback so freshly fetched timestamps sort
/// correctly before display formatting.
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    static DT: OnceLock<Regex> = OnceLock::new();
    let re = DT.get_or_init(|| {
        Regex::new(
            r"(?i)(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM)?)?",
        )
        .unwrap()
    });

    if let Some(c) = re.captures(s) {
        let month: u32 = c[1].parse().ok()?;
        let day: u32 = c[2].parse().ok()?;
        let year: i32 = c[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if let Some(h) = c.get(4) {
            let mut hours: u32 = h.as_str().parse().ok()?;
            let minutes: u32 = c[5].parse().ok()?;
            let seconds: u32 = c.get(6).map_or(0, |m| m.as_str().parse().unwrap_or(0));
            match c.get(7).map(|m| m.as_str().to_uppercase()) {
                Some(ref ap) if ap == "PM" && hours < 12 => hours += 12,
                Some(ref ap) if ap == "AM" && hours == 12 => hours = 0,
                _ => {}
            }
            return date.and_hms_opt(hours, minutes, seconds);
        }
        return date.and_hms_opt(0, 0, 0);
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
}

/// Render an ISO (or already-US) timestamp as `MM/DD/YYYY HH:MM AM/PM`.
/// Unparseable input passes through unchanged.
pub fn format_date_time(value: &str) -> String {
    let Some(dt) = parse_date_time(value) else {
        return value.to_string();
    };
    let (pm, hour12) = dt.hour12();
    format!(
        "{:02}/{:02}/{} {:02}:{:02} {}",
        dt.month(),
        dt.day(),
        dt.year(),
        hour12,
        dt.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// Outbound date form: keep existing ISO, else parse `MM/DD/YYYY`, else try a
/// generic parse. `None` when nothing parses (the field is then omitted).
pub fn to_iso(value: &str) -> Option<String> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    static ISO: OnceLock<Regex> = OnceLock::new();
    let iso = ISO.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").unwrap());
    if iso.is_match(s) {
        return Some(s.to_string());
    }
    static MDY: OnceLock<Regex> = OnceLock::new();
    let mdy = MDY.get_or_init(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap());
    if let Some(c) = mdy.captures(s) {
        let date = NaiveDate::from_ymd_opt(
            c[3].parse().ok()?,
            c[1].parse().ok()?,
            c[2].parse().ok()?,
        )?;
        return Some(format!("{}T00:00:00Z", date.format("%Y-%m-%d")));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")))
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Today's date in the canonical `MM/DD/YYYY` form.
pub fn today_us_date() -> String {
    Local::now().format("%m/%d/%Y").to_string()
}

// ---------------------------------------------------------------------------
// Enrollment DTO mapping
// ---------------------------------------------------------------------------

/// Map an arbitrary backend DTO into a canonical record. Each logical field
/// probes a prioritized list of alternate source keys; malformed or missing
/// values degrade to empty strings, never to an error.
pub fn normalize_enrollment(raw: &Value) -> EnrollmentRecord {
    let routing = probe(
        raw,
        &["routingNumber", "rtn", "bankId", "bankID", "bank_id", "routing_number"],
    );
    EnrollmentRecord {
        id: probe(raw, &["id", "guid", "enrollmentId", "detailId"]),
        eft_control: to_yn(&probe(raw, &["eftControl", "eftControlCode", "eft_control"])),
        eft_eligible: to_yn(&probe(
            raw,
            &["eftEligible", "eftIncentiveEligible", "eft_eligible"],
        )),
        start_date: us_date(&probe(
            raw,
            &["startDate", "beginDate", "effectiveDate", "start_date"],
        )),
        end_date: us_date(&probe(
            raw,
            &["endDate", "terminationDate", "expireDate", "end_date"],
        )),
        // Bank id and routing number are one value under two display names.
        bank_id: routing.clone(),
        routing_number: routing,
        account_number: probe(
            raw,
            &["accountNumber", "acctNumber", "accountNo", "account_number"],
        ),
        cs_ind: probe(raw, &["c_S_Ind", "csInd", "csIndicator", "cs_ind"]).to_uppercase(),
        last_change: us_date(&probe(
            raw,
            &["lastChangedDate", "lastChange", "lastChangeDate", "last_change_date", "last_change"],
        )),
        override_switch: to_yn(&probe(raw, &["override", "overrideSwitch", "override_switch"])),
        process_day: probe(
            raw,
            &["processDay", "processDayOfMonth", "cycleDay", "process_day"],
        ),
    }
}

/// Outbound save body for create/update. For update the record carries its
/// id; for add the id is omitted.
pub fn to_api_payload(record: &EnrollmentRecord, ssn: &str) -> Value {
    let routing = if record.routing_number.is_empty() {
        record.bank_id.clone()
    } else {
        record.routing_number.clone()
    };
    let mut obj = serde_json::Map::new();
    obj.insert("ssn".into(), Value::String(digits(ssn)));
    obj.insert("eftControl".into(), Value::String(to_yes_no(&record.eft_control)));
    obj.insert(
        "eftIncentiveEligible".into(),
        Value::String(to_yes_no(&record.eft_eligible)),
    );
    obj.insert("routingNumber".into(), Value::String(routing));
    obj.insert("accountNumber".into(), Value::String(record.account_number.clone()));
    obj.insert("c_S_Ind".into(), Value::String(record.cs_ind.to_lowercase()));
    obj.insert(
        "lastChangedDate".into(),
        Value::String(to_iso(&record.last_change).unwrap_or_else(now_iso)),
    );
    obj.insert("overrideSwitch".into(), Value::String(to_yes_no(&record.override_switch)));
    obj.insert("processDay".into(), Value::String(record.process_day.clone()));
    if !record.id.is_empty() {
        obj.insert("id".into(), Value::String(record.id.clone()));
    }
    if let Some(iso) = to_iso(&record.start_date) {
        obj.insert("startDate".into(), Value::String(iso));
    }
    if let Some(iso) = to_iso(&record.end_date) {
        obj.insert("endDate".into(), Value::String(iso));
    }
    Value::Object(obj)
}

/// Unwrap the enrollment list from any of the tolerated response shapes:
/// `{data:{borrowerDetails:[..]}}`, `{borrowerDetails:[..]}`, or a bare array.
pub fn extract_enrollment_list(resp: &Value) -> Vec<Value> {
    if let Some(arr) = resp
        .pointer("/data/borrowerDetails")
        .and_then(Value::as_array)
    {
        return arr.clone();
    }
    if let Some(arr) = resp.get("borrowerDetails").and_then(Value::as_array) {
        return arr.clone();
    }
    if let Some(arr) = resp.as_array() {
        return arr.clone();
    }
    Vec::new()
}

/// Best-effort mapping from a single-record response (detail fetch or save
/// echo) to a record. Tolerates `{data:..}` wrapping, a one-element array,
/// `{borrowerDetails:[..]}`, `{enrollment:..}`, and `{detail:..}`.
pub fn coerce_record_from_response(resp: &Value) -> Option<EnrollmentRecord> {
    if resp.is_null() {
        return None;
    }
    let container = resp.get("data").filter(|v| !v.is_null()).unwrap_or(resp);
    let dto = if let Some(arr) = container.as_array() {
        arr.first()?
    } else if let Some(arr) = container.get("borrowerDetails").and_then(Value::as_array) {
        arr.first()?
    } else {
        container
            .get("enrollment")
            .or_else(|| container.get("detail"))
            .filter(|v| !v.is_null())
            .unwrap_or(container)
    };
    Some(normalize_enrollment(dto))
}

// ---------------------------------------------------------------------------
// Borrower search mapping
// ---------------------------------------------------------------------------

/// Map a borrower search response to zero-or-one record. A payload with
/// neither an account number nor an SSN is treated as no match.
pub fn coerce_borrower(resp: &Value) -> Option<BorrowerRecord> {
    let payload = match resp.get("data") {
        Some(Value::Array(arr)) => arr.first()?,
        Some(v) if !v.is_null() => v,
        _ => resp,
    };
    if payload.is_null() || !payload.is_object() {
        return None;
    }
    let record = BorrowerRecord {
        full_name: probe(payload, &["name", "borrowerName", "fullName", "full_name"]),
        status: match probe(payload, &["status"]).as_str() {
            "Inactive" | "inactive" => BorrowerStatus::Inactive,
            _ => BorrowerStatus::Active,
        },
        ssn: format_ssn(&probe(payload, &["ssn", "SSN", "socialSecurityNumber"])),
        account_number: probe(
            payload,
            &["accountNumber", "accountNo", "account", "accountnumber", "account_number"],
        ),
        start_date: probe(payload, &["startDate", "start_date"]),
        end_date: probe(payload, &["endDate", "end_date"]),
        avatar_url: String::new(),
    };
    if record.account_number.is_empty() && record.ssn.is_empty() {
        return None;
    }
    Some(record)
}

// ---------------------------------------------------------------------------
// SSN display
// ---------------------------------------------------------------------------

/// Format an SSN-like input as `XXX-XX-XXXX`, keeping partial grouping for
/// partial input. Extra digits beyond nine are dropped.
pub fn format_ssn(input: &str) -> String {
    let d = digits(input);
    let d = &d[..d.len().min(9)];
    let part1 = &d[..d.len().min(3)];
    let part2 = &d[3.min(d.len())..d.len().min(5)];
    let part3 = &d[5.min(d.len())..];
    let mut out = String::from(part1);
    if !part1.is_empty() && !part2.is_empty() {
        out.push('-');
    }
    out.push_str(part2);
    if !part3.is_empty() {
        out.push('-');
    }
    out.push_str(part3);
    out
}

/// Masked display form: only the last four digits survive.
pub fn mask_ssn(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let d = digits(input);
    let d = &d[..d.len().min(9)];
    let part3 = &d[5.min(d.len())..];
    format!("***-**-{part3}")
}

// ---------------------------------------------------------------------------
// Status normalization
// ---------------------------------------------------------------------------

/// Substring-based, case-insensitive status classification.
pub fn normalize_status(status: &str) -> RequestStatus {
    let s = status.trim().to_lowercase();
    if s.contains("fail") {
        RequestStatus::Failed
    } else if s.contains("reject") {
        RequestStatus::Rejected
    } else if s.contains("succeed") || s.contains("complete") {
        RequestStatus::Succeeded
    } else if s.contains("pend") {
        RequestStatus::Pending
    } else {
        RequestStatus::Unclassified
    }
}

/// Validate and canonicalize a cycle date (`MM/DD/YYYY` or `YYYY-MM-DD`) for
/// job invocation. Impossible calendar dates come back empty.
pub fn normalize_cycle_date(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }
    static US: OnceLock<Regex> = OnceLock::new();
    static ISO: OnceLock<Regex> = OnceLock::new();
    let us = US.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
    let iso = ISO.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

    let (y, m, d) = if let Some(c) = us.captures(raw) {
        (c[3].to_string(), c[1].to_string(), c[2].to_string())
    } else if let Some(c) = iso.captures(raw) {
        (c[1].to_string(), c[2].to_string(), c[3].to_string())
    } else {
        return String::new();
    };
    let (Ok(year), Ok(month), Ok(day)) = (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>())
    else {
        return String::new();
    };
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(_) => format!("{month:02}/{day:02}/{year}"),
        None => String::new(),
    }
}
