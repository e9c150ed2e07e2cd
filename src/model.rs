use serde::{Deserialize, Deserializer, Serialize};

pub const STAR_STUDENT_BADGE: &str = "Star Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    Active,
    Deactivated,
}

impl StudentStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Deactivated,
            Self::Deactivated => Self::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamMark {
    pub subject: String,
    pub marks: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub student_phone: String,
    #[serde(default)]
    pub address: String,
    pub student_class: String,
    #[serde(default)]
    pub admission_date: String,
    pub status: StudentStatus,
    #[serde(default)]
    pub paid_months: Vec<String>,
    /// Dates marked present.
    #[serde(default)]
    pub attendance: Vec<String>,
    /// Dates marked absent. Never shares a date with `attendance`.
    #[serde(default)]
    pub absences: Vec<String>,
    #[serde(default)]
    pub exam_marks: Vec<ExamMark>,
    #[serde(default)]
    pub syllabus_progress: u8,
    #[serde(default)]
    pub monthly_fee: f64,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_icon: Option<String>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }

    pub fn has_paid(&self, month_id: &str) -> bool {
        self.paid_months.iter().any(|m| m == month_id)
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }
}

/// Admission form payload. Identity, status and history are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub student_phone: String,
    #[serde(default)]
    pub address: String,
    pub student_class: String,
    #[serde(default)]
    pub admission_date: String,
    #[serde(default)]
    pub monthly_fee: f64,
    #[serde(default)]
    pub profile_icon: Option<String>,
}

/// Partial edit of a student. Payments and attendance are left out: they change only through
/// fee toggling and attendance recording. `profileIcon: null` clears the icon.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub student_phone: Option<String>,
    pub address: Option<String>,
    pub student_class: Option<String>,
    pub admission_date: Option<String>,
    pub monthly_fee: Option<f64>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub profile_icon: Option<Option<String>>,
    pub status: Option<StudentStatus>,
    pub exam_marks: Option<Vec<ExamMark>>,
    pub badges: Option<Vec<String>>,
}

// A present key becomes `Some`, so an explicit `null` is told apart from an absent key.
fn present_or_null<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl StudentPatch {
    pub fn apply_to(self, s: &mut Student) {
        if let Some(v) = self.name {
            s.name = v;
        }
        if let Some(v) = self.dob {
            s.dob = v;
        }
        if let Some(v) = self.guardian_name {
            s.guardian_name = v;
        }
        if let Some(v) = self.guardian_phone {
            s.guardian_phone = v;
        }
        if let Some(v) = self.student_phone {
            s.student_phone = v;
        }
        if let Some(v) = self.address {
            s.address = v;
        }
        if let Some(v) = self.student_class {
            s.student_class = v;
        }
        if let Some(v) = self.admission_date {
            s.admission_date = v;
        }
        if let Some(v) = self.monthly_fee {
            s.monthly_fee = v;
        }
        if let Some(v) = self.profile_icon {
            s.profile_icon = v;
        }
        if let Some(v) = self.status {
            s.status = v;
        }
        if let Some(v) = self.exam_marks {
            s.exam_marks = v;
        }
        if let Some(v) = self.badges {
            s.badges = v;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Training,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub title: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    #[serde(default)]
    pub completed: bool,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchedule {
    pub title: String,
    #[serde(default)]
    pub time: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub target_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub event: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    pub student_id: String,
    pub marks: f64,
    pub total: f64,
}

/// The whole persisted state. Missing keys load as empty collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub syllabus_topics: Vec<SyllabusTopic>,
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}

impl AppData {
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}
