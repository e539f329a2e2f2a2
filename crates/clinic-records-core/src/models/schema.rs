//! Declared column sets.

use serde::{Deserialize, Serialize};

use super::Field;

/// Which family of forms a table serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Intake and doctor-update records.
    Patients,
    /// Appointment bookings only.
    Appointments,
    /// Patient records with an appointment sub-record in the same row.
    #[default]
    Combined,
}

impl std::str::FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patients" => Ok(SchemaKind::Patients),
            "appointments" => Ok(SchemaKind::Appointments),
            "combined" => Ok(SchemaKind::Combined),
            other => Err(format!("unknown schema '{}'", other)),
        }
    }
}

const PATIENT_COLUMNS: [Field; 16] = [
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
];

const APPOINTMENT_COLUMNS: [Field; 4] = [
    Field::ApptName,
    Field::ApptDate,
    Field::ApptTime,
    Field::ApptPayment,
];

/// Ordered list of declared columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    kind: SchemaKind,
    columns: Vec<Field>,
}

impl Schema {
    pub fn patients() -> Self {
        Self {
            kind: SchemaKind::Patients,
            columns: PATIENT_COLUMNS.to_vec(),
        }
    }

    pub fn appointments() -> Self {
        Self {
            kind: SchemaKind::Appointments,
            columns: APPOINTMENT_COLUMNS.to_vec(),
        }
    }

    pub fn combined() -> Self {
        let mut columns = PATIENT_COLUMNS.to_vec();
        columns.extend_from_slice(&APPOINTMENT_COLUMNS);
        Self {
            kind: SchemaKind::Combined,
            columns,
        }
    }

    pub fn for_kind(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Patients => Self::patients(),
            SchemaKind::Appointments => Self::appointments(),
            SchemaKind::Combined => Self::combined(),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    /// Position of a field in the declared order.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|f| *f == field)
    }

    /// Header row in declared order.
    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|f| f.header().to_string()).collect()
    }

    /// Fields a new row must carry.
    pub fn required(&self) -> &'static [Field] {
        match self.kind {
            SchemaKind::Patients | SchemaKind::Combined => &[Field::FullName],
            SchemaKind::Appointments => &[Field::ApptName, Field::ApptTime],
        }
    }

    /// Fields whose emptiness marks a record as still waiting for the doctor.
    ///
    /// Appointment-aware schemas also count a booked appointment as progress.
    pub fn status_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = [Field::Diagnosis, Field::Treatment, Field::Plan]
            .into_iter()
            .filter(|f| self.has(*f))
            .collect();
        if self.has(Field::ApptName) {
            fields.push(Field::ApptName);
        }
        fields
    }

    /// Column used to place appointments on the calendar.
    pub fn appointment_date_field(&self) -> Option<Field> {
        if self.has(Field::ApptDate) {
            Some(Field::ApptDate)
        } else if self.has(Field::Date) {
            Some(Field::Date)
        } else {
            None
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::combined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Schema::patients().columns().len(), 16);
        assert_eq!(
            Schema::appointments().header(),
            vec![
                "Patient Name",
                "Appointment Date",
                "Appointment Time (manual)",
                "Payment"
            ]
        );
        assert_eq!(Schema::combined().columns().len(), 20);
    }

    #[test]
    fn test_status_fields() {
        assert_eq!(
            Schema::patients().status_fields(),
            vec![Field::Diagnosis, Field::Treatment, Field::Plan]
        );
        assert_eq!(
            Schema::combined().status_fields(),
            vec![Field::Diagnosis, Field::Treatment, Field::Plan, Field::ApptName]
        );
    }

    #[test]
    fn test_appointment_date_field() {
        assert_eq!(Schema::combined().appointment_date_field(), Some(Field::ApptDate));
        assert_eq!(Schema::patients().appointment_date_field(), Some(Field::Date));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Combined".parse::<SchemaKind>(), Ok(SchemaKind::Combined));
        assert!("ledger".parse::<SchemaKind>().is_err());
    }
}
