//! Weekly study plans per programme.

use chrono::Weekday;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Programme {
    Bca,
    BTech,
    Other,
}

impl Programme {
    pub const ALL: [Programme; 3] = [Programme::Bca, Programme::BTech, Programme::Other];

    /// Unknown programme names get the generic plan.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace([' ', '.'], "").as_str() {
            "bca" => Programme::Bca,
            "btech" => Programme::BTech,
            _ => Programme::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Programme::Bca => "BCA",
            Programme::BTech => "B.Tech",
            Programme::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayPlan {
    pub day: Weekday,
    pub topics: &'static [&'static str],
}

const fn plan(day: Weekday, topics: &'static [&'static str]) -> DayPlan {
    DayPlan { day, topics }
}

const BCA_PLAN: [DayPlan; 7] = [
    plan(Weekday::Mon, &["C++ Basics", "Data Structures Intro"]),
    plan(Weekday::Tue, &["Mathematics II", "Digital Electronics"]),
    plan(Weekday::Wed, &["Web Development (HTML/CSS)", "C++ OOPs"]),
    plan(Weekday::Thu, &["Database Management", "Operating Systems"]),
    plan(Weekday::Fri, &["Practical Labs", "Revision"]),
    plan(Weekday::Sat, &["Project Work", "Weekly Quiz"]),
    plan(Weekday::Sun, &["Rest & Review"]),
];

const BTECH_PLAN: [DayPlan; 7] = [
    plan(Weekday::Mon, &["Engineering Math", "Physics"]),
    plan(Weekday::Tue, &["Chemistry", "Programming in C"]),
    plan(Weekday::Wed, &["Basic Electrical", "Engineering Graphics"]),
    plan(Weekday::Thu, &["Data Structures", "Algorithms"]),
    plan(Weekday::Fri, &["Lab Work", "Workshops"]),
    plan(Weekday::Sat, &["Mini Project", "Assignments"]),
    plan(Weekday::Sun, &["Rest"]),
];

const GENERIC_PLAN: [DayPlan; 7] = [
    plan(Weekday::Mon, &["Subject 1", "Subject 2"]),
    plan(Weekday::Tue, &["Subject 3", "Subject 4"]),
    plan(Weekday::Wed, &["Revision", "Practice"]),
    plan(Weekday::Thu, &["Subject 1", "Subject 3"]),
    plan(Weekday::Fri, &["Subject 2", "Subject 4"]),
    plan(Weekday::Sat, &["Mock Tests", "Review"]),
    plan(Weekday::Sun, &["Rest"]),
];

/// Monday-to-Sunday plan for a programme.
pub fn weekly_plan(programme: Programme) -> &'static [DayPlan] {
    match programme {
        Programme::Bca => &BCA_PLAN,
        Programme::BTech => &BTECH_PLAN,
        Programme::Other => &GENERIC_PLAN,
    }
}

pub fn plan_for_day(programme: Programme, day: Weekday) -> Option<&'static DayPlan> {
    weekly_plan(programme).iter().find(|plan| plan.day == day)
}
