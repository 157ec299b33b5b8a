//! Pure list filtering and derivations used by the dashboards.
//!
//! Everything here works on already-loaded rows and never touches the backend.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::entities::{Course, Note, NoteHistory, NoteStatus, Profile};

/// Subject selector on the notes lists. `ALL` and `all` both mean every subject.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubjectFilter {
    #[default]
    All,
    Named(String),
}

impl SubjectFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            SubjectFilter::All
        } else {
            SubjectFilter::Named(value.to_string())
        }
    }

    pub fn matches(&self, subject: &str) -> bool {
        match self {
            SubjectFilter::All => true,
            SubjectFilter::Named(name) => subject == name,
        }
    }
}

/// Status selector on the admin notes list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(NoteStatus),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            StatusFilter::All
        } else {
            StatusFilter::Only(NoteStatus::parse(value))
        }
    }

    pub fn matches(&self, status: &NoteStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == wanted,
        }
    }
}

/// Combined notes filter. The three predicates are independent, so applying
/// them in any order gives the same result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub subject: SubjectFilter,
    pub status: StatusFilter,
    pub search: String,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        self.subject.matches(&note.subject) && self.status.matches(&note.status) && title_matches(note, &self.search)
    }

    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        notes.iter().filter(|note| self.matches(note)).cloned().collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn title_matches(note: &Note, search: &str) -> bool {
    search.is_empty() || contains_ignore_case(&note.title, search)
}

pub fn filter_by_subject(notes: &[Note], subject: &SubjectFilter) -> Vec<Note> {
    notes.iter().filter(|n| subject.matches(&n.subject)).cloned().collect()
}

pub fn filter_by_status(notes: &[Note], status: &StatusFilter) -> Vec<Note> {
    notes.iter().filter(|n| status.matches(&n.status)).cloned().collect()
}

pub fn filter_by_search(notes: &[Note], search: &str) -> Vec<Note> {
    notes.iter().filter(|n| title_matches(n, search)).cloned().collect()
}

/// Distinct subjects in first-seen order.
pub fn note_subjects(notes: &[Note]) -> Vec<String> {
    let mut seen = HashSet::new();
    notes
        .iter()
        .filter(|note| !note.subject.is_empty())
        .filter(|note| seen.insert(note.subject.as_str()))
        .map(|note| note.subject.clone())
        .collect()
}

/// Notes whose ids are bookmarked, in the notes' order.
pub fn saved_notes(notes: &[Note], bookmarks: &HashSet<String>) -> Vec<Note> {
    notes.iter().filter(|n| bookmarks.contains(&n.id)).cloned().collect()
}

/// Notes matching the profile's course in subject or title.
///
/// Without a course on the profile the newest notes are suggested instead.
/// `notes` is expected newest first.
pub fn recommended_notes(notes: &[Note], profile: Option<&Profile>, limit: usize) -> Vec<Note> {
    let course = profile
        .and_then(|p| p.course.as_deref())
        .map(str::trim)
        .filter(|course| !course.is_empty());

    match course {
        Some(course) => notes
            .iter()
            .filter(|n| contains_ignore_case(&n.subject, course) || contains_ignore_case(&n.title, course))
            .take(limit)
            .cloned()
            .collect(),
        None => notes.iter().take(limit).cloned().collect(),
    }
}

/// Notes from the history rows, in history order, each note at most once.
/// History rows pointing at notes that no longer exist are skipped.
pub fn recently_viewed(history: &[NoteHistory], notes: &[Note], limit: usize) -> Vec<Note> {
    let by_id: HashMap<&str, &Note> = notes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut seen = HashSet::new();
    history
        .iter()
        .filter_map(|entry| by_id.get(entry.note_id.as_str()).copied())
        .filter(|note| seen.insert(note.id.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

/// Users whose full name or email contains `search`, ignoring case.
pub fn filter_users(users: &[Profile], search: &str) -> Vec<Profile> {
    let search = search.trim();
    if search.is_empty() {
        return users.to_vec();
    }
    users
        .iter()
        .filter(|u| {
            u.full_name.as_deref().is_some_and(|name| contains_ignore_case(name, search))
                || u.email.as_deref().is_some_and(|email| contains_ignore_case(email, search))
        })
        .cloned()
        .collect()
}

pub const ALL_CATEGORIES: &str = "All";

/// `All` followed by each embedded subject name once, in first-seen order.
pub fn course_categories(courses: &[Course]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(
            courses
                .iter()
                .filter_map(Course::category)
                .filter(|name| seen.insert(*name))
                .map(str::to_string),
        )
        .collect()
}

/// Courses matching `search` in title or description and the selected category.
pub fn filter_courses(courses: &[Course], search: &str, category: &str) -> Vec<Course> {
    courses
        .iter()
        .filter(|course| {
            search.is_empty()
                || contains_ignore_case(&course.title, search)
                || course
                    .description
                    .as_deref()
                    .is_some_and(|description| contains_ignore_case(description, search))
        })
        .filter(|course| category.is_empty() || category == ALL_CATEGORIES || course.category() == Some(category))
        .cloned()
        .collect()
}

/// Numbers behind the admin analytics charts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Analytics {
    /// Notes per subject, ordered by subject name.
    pub subject_distribution: Vec<(String, usize)>,
    pub active_users: usize,
    pub blocked_users: usize,
    pub total_users: usize,
    pub total_notes: usize,
    pub pending_notes: usize,
}

pub fn analytics(notes: &[Note], users: &[Profile]) -> Analytics {
    let mut subjects: BTreeMap<String, usize> = BTreeMap::new();
    for note in notes {
        *subjects.entry(note.subject.clone()).or_default() += 1;
    }
    let blocked_users = users.iter().filter(|u| u.blocked).count();

    Analytics {
        subject_distribution: subjects.into_iter().collect(),
        active_users: users.len() - blocked_users,
        blocked_users,
        total_users: users.len(),
        total_notes: notes.len(),
        pending_notes: notes.iter().filter(|n| n.status == NoteStatus::Pending).count(),
    }
}
