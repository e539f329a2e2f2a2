//! Column definitions shared by every record schema.

use serde::{Deserialize, Serialize};

/// A single column of the clinic record table.
///
/// This is the superset of every column used by intake, doctor-update and
/// appointment forms. A [`Schema`](super::Schema) picks the subset it stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PatientId,
    FullName,
    Date,
    Age,
    Gender,
    Phone,
    VisualAcuity,
    Iop,
    Medication,
    Diagnosis,
    Treatment,
    Plan,
    Ac,
    Fundus,
    Remarks,
    SurgeryScheduled,
    ApptName,
    ApptDate,
    ApptTime,
    ApptPayment,
}

/// Header spellings used by older sheets, mapped to their current field.
const LEGACY_HEADERS: &[(&str, Field)] = &[
    ("appt_name", Field::ApptName),
    ("appt_date", Field::ApptDate),
    ("appt_time", Field::ApptTime),
    ("appt_payment", Field::ApptPayment),
    ("name", Field::FullName),
    ("id", Field::PatientId),
    ("va", Field::VisualAcuity),
    ("surgery", Field::SurgeryScheduled),
];

impl Field {
    pub const ALL: [Field; 20] = [
        Field::PatientId,
        Field::FullName,
        Field::Date,
        Field::Age,
        Field::Gender,
        Field::Phone,
        Field::VisualAcuity,
        Field::Iop,
        Field::Medication,
        Field::Diagnosis,
        Field::Treatment,
        Field::Plan,
        Field::Ac,
        Field::Fundus,
        Field::Remarks,
        Field::SurgeryScheduled,
        Field::ApptName,
        Field::ApptDate,
        Field::ApptTime,
        Field::ApptPayment,
    ];

    /// Canonical header written to the local file and the remote sheet.
    pub fn header(self) -> &'static str {
        match self {
            Field::PatientId => "Patient ID",
            Field::FullName => "Full Name",
            Field::Date => "Date",
            Field::Age => "Age",
            Field::Gender => "Gender",
            Field::Phone => "Phone",
            Field::VisualAcuity => "Visual Acuity",
            Field::Iop => "IOP",
            Field::Medication => "Medication",
            Field::Diagnosis => "Diagnosis",
            Field::Treatment => "Treatment",
            Field::Plan => "Plan",
            Field::Ac => "AC",
            Field::Fundus => "Fundus",
            Field::Remarks => "Remarks",
            Field::SurgeryScheduled => "Surgery Scheduled",
            Field::ApptName => "Patient Name",
            Field::ApptDate => "Appointment Date",
            Field::ApptTime => "Appointment Time (manual)",
            Field::ApptPayment => "Payment",
        }
    }

    /// snake_case identifier, as used in config and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Field::PatientId => "patient_id",
            Field::FullName => "full_name",
            Field::Date => "date",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Phone => "phone",
            Field::VisualAcuity => "visual_acuity",
            Field::Iop => "iop",
            Field::Medication => "medication",
            Field::Diagnosis => "diagnosis",
            Field::Treatment => "treatment",
            Field::Plan => "plan",
            Field::Ac => "ac",
            Field::Fundus => "fundus",
            Field::Remarks => "remarks",
            Field::SurgeryScheduled => "surgery_scheduled",
            Field::ApptName => "appt_name",
            Field::ApptDate => "appt_date",
            Field::ApptTime => "appt_time",
            Field::ApptPayment => "appt_payment",
        }
    }

    /// Resolve a header cell to a field.
    ///
    /// Accepts the canonical header, the snake_case key and the legacy
    /// spellings, all case-insensitively. Unknown headers return `None`.
    pub fn from_header(header: &str) -> Option<Field> {
        let wanted = header.trim();
        if wanted.is_empty() {
            return None;
        }

        Field::ALL
            .iter()
            .copied()
            .find(|f| f.header().eq_ignore_ascii_case(wanted) || f.key().eq_ignore_ascii_case(wanted))
            .or_else(|| {
                LEGACY_HEADERS
                    .iter()
                    .find(|(legacy, _)| legacy.eq_ignore_ascii_case(wanted))
                    .map(|(_, field)| *field)
            })
    }

    /// Fields filled in by the doctor rather than at intake.
    pub fn is_doctor_authored(self) -> bool {
        matches!(
            self,
            Field::Diagnosis
                | Field::Treatment
                | Field::Plan
                | Field::Ac
                | Field::Fundus
                | Field::Remarks
                | Field::SurgeryScheduled
        )
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Compose a per-eye value the way the intake form stores it.
pub fn compose_eye_pair(right: &str, left: &str) -> String {
    format!("RA ({}) ; LA ({})", right.trim(), left.trim())
}

/// Split a value produced by [`compose_eye_pair`] back into (right, left).
pub fn split_eye_pair(value: &str) -> Option<(String, String)> {
    let (ra, la) = value.split_once(';')?;
    let inner = |part: &str, prefix: &str| -> Option<String> {
        let rest = part.trim().strip_prefix(prefix)?.trim_start();
        let rest = rest.strip_prefix('(')?.strip_suffix(')')?;
        Some(rest.trim().to_string())
    };
    Some((inner(ra, "RA")?, inner(la, "LA")?))
}
