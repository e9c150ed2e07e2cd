use crate::audit;
use crate::calc;
use crate::config::ReferenceData;
use crate::db::StateStorage;
use crate::gate::{ConfirmationGate, ConfirmationRequest, GateError, GuardedAction};
use crate::model::{
    AppData, ExamMark, MarkEntry, NewSchedule, NewStudent, Schedule, Student, StudentPatch,
    StudentStatus, SyllabusTopic, STAR_STUDENT_BADGE,
};
use log::{info, warn};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug)]
pub enum StoreError {
    NotFound { entity: &'static str, id: String },
    UnknownClass(String),
    AlreadyHighestClass { name: String, class: String },
    NoPendingConfirmation,
    ConfirmationMismatch { open_request_id: String },
    Storage(anyhow::Error),
    Backup(anyhow::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::UnknownClass(_) => "unknown_class",
            Self::AlreadyHighestClass { .. } => "invalid_operation",
            Self::NoPendingConfirmation => "no_pending_confirmation",
            Self::ConfirmationMismatch { .. } => "confirmation_mismatch",
            Self::Storage(_) => "storage_failed",
            Self::Backup(_) => "backup_failed",
        }
    }

    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{} not found: {}", entity, id),
            Self::UnknownClass(c) => write!(f, "unknown class: {}", c),
            Self::AlreadyHighestClass { name, class } => {
                write!(f, "{} is already in the highest class ({})", name, class)
            }
            Self::NoPendingConfirmation => write!(f, "no confirmation is pending"),
            Self::ConfirmationMismatch { .. } => {
                write!(f, "request id does not match the open confirmation")
            }
            Self::Storage(e) => write!(f, "failed to persist state: {:#}", e),
            Self::Backup(e) => write!(f, "backup could not be restored: {:#}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<GateError> for StoreError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::NothingPending => Self::NoPendingConfirmation,
            GateError::Mismatch { open_request_id } => Self::ConfirmationMismatch { open_request_id },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum FeeToggle {
    Paid,
    ConfirmationRequired(ConfirmationRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    pub student_name: String,
    pub from_class: String,
    pub to_class: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmedAction {
    StudentDeleted { student_id: String },
    FeeUnchecked { student_id: String, month: String },
    BackupRestored { bundle_path: PathBuf },
}

/// Loads a backup bundle into state when a restore is confirmed.
pub type BundleLoader = dyn Fn(&std::path::Path) -> anyhow::Result<AppData>;

/// Sole owner of the application state. Every mutation is built on a copy,
/// audited, saved, and only then swapped in, so a failed save changes nothing.
pub struct Store<S: StateStorage> {
    storage: S,
    data: AppData,
    reference: ReferenceData,
    gate: ConfirmationGate,
}

impl<S: StateStorage> Store<S> {
    pub fn open(storage: S, reference: ReferenceData) -> anyhow::Result<Self> {
        let data = storage.load()?.unwrap_or_default();
        info!(
            "loaded state: {} students, {} schedules, {} topics, {} audit entries",
            data.students.len(),
            data.schedules.len(),
            data.syllabus_topics.len(),
            data.audit_logs.len()
        );
        Ok(Self {
            storage,
            data,
            reference,
            gate: ConfirmationGate::default(),
        })
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.gate.pending()
    }

    pub fn student(&self, id: &str) -> StoreResult<&Student> {
        self.data
            .student(id)
            .ok_or_else(|| StoreError::not_found("student", id))
    }

    fn commit(&mut self, mut next: AppData, event: String) -> StoreResult<()> {
        audit::prepend(&mut next.audit_logs, audit::new_entry(event.clone()));
        if let Err(e) = self.storage.save(&next) {
            warn!("state not saved, mutation discarded ({}): {:#}", event, e);
            return Err(StoreError::Storage(e));
        }
        info!("{}", event);
        self.data = next;
        Ok(())
    }

    fn ensure_class(&self, class: &str) -> StoreResult<()> {
        if self.reference.class_index(class).is_none() {
            return Err(StoreError::UnknownClass(class.to_string()));
        }
        Ok(())
    }

    fn student_index(&self, id: &str) -> StoreResult<usize> {
        self.data
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("student", id))
    }

    pub fn record_login(&mut self) -> StoreResult<()> {
        let next = self.data.clone();
        self.commit(next, "Admin Logged In successfully".to_string())
    }

    pub fn admit_student(&mut self, form: NewStudent) -> StoreResult<Student> {
        self.ensure_class(&form.student_class)?;
        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            dob: form.dob,
            guardian_name: form.guardian_name,
            guardian_phone: form.guardian_phone,
            student_phone: form.student_phone,
            address: form.address,
            student_class: form.student_class,
            admission_date: form.admission_date,
            status: StudentStatus::Active,
            paid_months: Vec::new(),
            attendance: Vec::new(),
            absences: Vec::new(),
            exam_marks: Vec::new(),
            syllabus_progress: 0,
            monthly_fee: form.monthly_fee,
            badges: Vec::new(),
            profile_icon: form.profile_icon,
        };
        let mut next = self.data.clone();
        next.students.push(student.clone());
        self.commit(next, format!("New Admission: {}", student.name))?;
        Ok(student)
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) -> StoreResult<Student> {
        if let Some(class) = &patch.student_class {
            self.ensure_class(class)?;
        }
        let idx = self.student_index(id)?;
        let mut next = self.data.clone();
        patch.apply_to(&mut next.students[idx]);
        let updated = next.students[idx].clone();
        self.commit(next, format!("Updated profile for Student: {}", updated.name))?;
        Ok(updated)
    }

    pub fn request_delete_student(&mut self, id: &str) -> StoreResult<ConfirmationRequest> {
        let name = self.student(id)?.name.clone();
        Ok(self.gate.request(
            GuardedAction::DeleteStudent {
                student_id: id.to_string(),
            },
            format!("Permanently delete {}", name),
        ))
    }

    pub fn toggle_fee(&mut self, id: &str, month: &str) -> StoreResult<FeeToggle> {
        let idx = self.student_index(id)?;
        let student = &self.data.students[idx];
        if student.has_paid(month) {
            let summary = format!("Uncheck fee for {} ({})", student.name, month);
            let req = self.gate.request(
                GuardedAction::UncheckFee {
                    student_id: id.to_string(),
                    month: month.to_string(),
                },
                summary,
            );
            return Ok(FeeToggle::ConfirmationRequired(req));
        }
        let mut next = self.data.clone();
        next.students[idx].paid_months.push(month.to_string());
        let event = format!("Fee Paid: {} for {}", next.students[idx].name, month);
        self.commit(next, event)?;
        Ok(FeeToggle::Paid)
    }

    pub fn promote_student(&mut self, id: &str) -> StoreResult<Promotion> {
        let idx = self.student_index(id)?;
        let student = &self.data.students[idx];
        if self.reference.class_index(&student.student_class).is_none() {
            return Err(StoreError::UnknownClass(student.student_class.clone()));
        }
        let Some(to_class) = self.reference.next_class(&student.student_class) else {
            return Err(StoreError::AlreadyHighestClass {
                name: student.name.clone(),
                class: student.student_class.clone(),
            });
        };
        let promotion = Promotion {
            student_name: student.name.clone(),
            from_class: student.student_class.clone(),
            to_class: to_class.to_string(),
        };
        let mut next = self.data.clone();
        next.students[idx].student_class = promotion.to_class.clone();
        self.commit(
            next,
            format!(
                "Student Promoted: {} from {} to {}",
                promotion.student_name, promotion.from_class, promotion.to_class
            ),
        )?;
        Ok(promotion)
    }

    pub fn toggle_deactivation(&mut self, id: &str) -> StoreResult<StudentStatus> {
        let idx = self.student_index(id)?;
        let mut next = self.data.clone();
        let student = &mut next.students[idx];
        student.status = student.status.toggled();
        let status = student.status;
        let verb = match status {
            StudentStatus::Active => "Reactivated",
            StudentStatus::Deactivated => "Archived",
        };
        let event = format!("Account {}: {}", verb, student.name);
        self.commit(next, event)?;
        Ok(status)
    }

    /// Returns how many students in `target_class` were touched.
    pub fn record_attendance(
        &mut self,
        date: &str,
        present_ids: &[String],
        absent_ids: &[String],
        target_class: &str,
    ) -> StoreResult<usize> {
        self.ensure_class(target_class)?;
        let present: HashSet<&str> = present_ids.iter().map(|s| s.as_str()).collect();
        let absent: HashSet<&str> = absent_ids.iter().map(|s| s.as_str()).collect();

        let mut next = self.data.clone();
        let mut touched = 0;
        for s in next
            .students
            .iter_mut()
            .filter(|s| s.student_class == target_class)
        {
            touched += 1;
            s.attendance.retain(|d| d != date);
            s.absences.retain(|d| d != date);
            if present.contains(s.id.as_str()) {
                s.attendance.push(date.to_string());
            } else if absent.contains(s.id.as_str()) {
                s.absences.push(date.to_string());
            }
        }
        self.commit(
            next,
            format!("Attendance recorded for {} on {}", target_class, date),
        )?;
        Ok(touched)
    }

    /// Replaces each submitted student's mark for `subject` and recomputes the star badge
    /// across the submitted set. Returns the ids that hold the badge afterwards.
    pub fn record_bulk_marks(
        &mut self,
        target_class: &str,
        subject: &str,
        entries: &[MarkEntry],
    ) -> StoreResult<Vec<String>> {
        self.ensure_class(target_class)?;
        let in_class: HashSet<&str> = self
            .data
            .students
            .iter()
            .filter(|s| s.student_class == target_class)
            .map(|s| s.id.as_str())
            .collect();
        let evaluated: Vec<&MarkEntry> = entries
            .iter()
            .filter(|e| in_class.contains(e.student_id.as_str()))
            .collect();
        let stars = calc::star_performers(evaluated.iter().copied());

        let mut next = self.data.clone();
        for s in next
            .students
            .iter_mut()
            .filter(|s| s.student_class == target_class)
        {
            let Some(entry) = evaluated.iter().find(|e| e.student_id == s.id) else {
                continue;
            };
            s.exam_marks.retain(|m| m.subject != subject);
            s.exam_marks.push(ExamMark {
                subject: subject.to_string(),
                marks: entry.marks,
                total: entry.total,
            });
            if stars.contains(&s.id) {
                if !s.has_badge(STAR_STUDENT_BADGE) {
                    s.badges.push(STAR_STUDENT_BADGE.to_string());
                }
            } else {
                s.badges.retain(|b| b != STAR_STUDENT_BADGE);
            }
        }
        self.commit(
            next,
            format!("Exam results updated for {} - {}", target_class, subject),
        )?;
        Ok(stars)
    }

    pub fn add_schedule(&mut self, form: NewSchedule) -> StoreResult<Schedule> {
        let schedule = Schedule {
            id: Uuid::new_v4().to_string(),
            title: form.title,
            time: form.time,
            kind: form.kind,
            completed: false,
            date: form.date,
        };
        let mut next = self.data.clone();
        next.schedules.push(schedule.clone());
        self.commit(
            next,
            format!("Schedule added: {} on {}", schedule.title, schedule.date),
        )?;
        Ok(schedule)
    }

    pub fn toggle_schedule(&mut self, id: &str) -> StoreResult<Schedule> {
        let mut next = self.data.clone();
        let schedule = next
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("schedule", id))?;
        schedule.completed = !schedule.completed;
        let schedule = schedule.clone();
        let verb = if schedule.completed { "completed" } else { "reopened" };
        self.commit(next, format!("Schedule {}: {}", verb, schedule.title))?;
        Ok(schedule)
    }

    pub fn delete_schedule(&mut self, id: &str) -> StoreResult<()> {
        let mut next = self.data.clone();
        let idx = next
            .schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("schedule", id))?;
        let removed = next.schedules.remove(idx);
        self.commit(next, format!("Schedule removed: {}", removed.title))
    }

    pub fn add_syllabus_topic(&mut self, title: &str, target_class: &str) -> StoreResult<SyllabusTopic> {
        self.ensure_class(target_class)?;
        let topic = SyllabusTopic {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            target_class: target_class.to_string(),
        };
        let mut next = self.data.clone();
        next.syllabus_topics.push(topic.clone());
        self.commit(
            next,
            format!("Syllabus topic added for {}: {}", topic.target_class, topic.title),
        )?;
        Ok(topic)
    }

    /// Flips completion and rewrites the class's progress onto every student in it.
    /// Returns the new progress percentage.
    pub fn toggle_syllabus_topic(&mut self, id: &str) -> StoreResult<u8> {
        let mut next = self.data.clone();
        let topic = next
            .syllabus_topics
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("syllabus topic", id))?;
        topic.completed = !topic.completed;
        let topic = topic.clone();

        let progress = calc::syllabus_progress(&next.syllabus_topics, &topic.target_class);
        for s in next
            .students
            .iter_mut()
            .filter(|s| s.student_class == topic.target_class)
        {
            s.syllabus_progress = progress;
        }
        let verb = if topic.completed { "completed" } else { "reopened" };
        self.commit(
            next,
            format!(
                "Syllabus topic {} for {}: {} ({}%)",
                verb, topic.target_class, topic.title, progress
            ),
        )?;
        Ok(progress)
    }

    pub fn delete_syllabus_topic(&mut self, id: &str) -> StoreResult<()> {
        let mut next = self.data.clone();
        let idx = next
            .syllabus_topics
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("syllabus topic", id))?;
        let removed = next.syllabus_topics.remove(idx);
        self.commit(
            next,
            format!(
                "Syllabus topic removed for {}: {}",
                removed.target_class, removed.title
            ),
        )
    }

    pub fn request_restore(&mut self, bundle_path: PathBuf) -> ConfirmationRequest {
        let summary = format!(
            "Replace all data with backup {}",
            bundle_path.to_string_lossy()
        );
        self.gate
            .request(GuardedAction::RestoreBackup { bundle_path }, summary)
    }

    pub fn cancel_confirmation(&mut self, request_id: &str) -> StoreResult<ConfirmationRequest> {
        Ok(self.gate.cancel(request_id)?)
    }

    /// Drops whatever request is open without running it.
    pub fn discard_confirmation(&mut self) -> Option<ConfirmationRequest> {
        self.gate.clear()
    }

    /// Runs the action bound to the open request. The gate closes even if the action then fails.
    pub fn confirm(&mut self, request_id: &str, load_bundle: &BundleLoader) -> StoreResult<ConfirmedAction> {
        match self.gate.confirm(request_id)? {
            GuardedAction::DeleteStudent { student_id } => {
                let idx = self.student_index(&student_id)?;
                let mut next = self.data.clone();
                let removed = next.students.remove(idx);
                self.commit(
                    next,
                    format!(
                        "Security Authorized: Permanent Delete Student - {}",
                        removed.name
                    ),
                )?;
                Ok(ConfirmedAction::StudentDeleted { student_id })
            }
            GuardedAction::UncheckFee { student_id, month } => {
                let idx = self.student_index(&student_id)?;
                let mut next = self.data.clone();
                let student = &mut next.students[idx];
                student.paid_months.retain(|m| *m != month);
                let event = format!(
                    "Security Authorized: Unchecked fee for {} ({})",
                    student.name, month
                );
                self.commit(next, event)?;
                Ok(ConfirmedAction::FeeUnchecked { student_id, month })
            }
            GuardedAction::RestoreBackup { bundle_path } => {
                let restored = load_bundle(bundle_path.as_path()).map_err(StoreError::Backup)?;
                self.commit(
                    restored,
                    "Security Authorized: Workspace restored from backup".to_string(),
                )?;
                Ok(ConfirmedAction::BackupRestored { bundle_path })
            }
        }
    }
}
