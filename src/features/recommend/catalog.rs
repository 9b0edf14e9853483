use super::{ContentItem, ContentKind};

/// The built-in content catalog the recommendation engine scores.
/// Static on purpose: content lives in the repository, not in the
/// database, and changes only with releases.
pub const CATALOG: &[ContentItem] = &[
    ContentItem {
        id: 1,
        title: "Greetings and introductions",
        kind: ContentKind::Lesson,
        level: 1,
        topic: "daily life",
    },
    ContentItem {
        id: 2,
        title: "Numbers, dates and money",
        kind: ContentKind::Lesson,
        level: 1,
        topic: "daily life",
    },
    ContentItem {
        id: 3,
        title: "Ordering at a restaurant",
        kind: ContentKind::Reading,
        level: 2,
        topic: "food",
    },
    ContentItem {
        id: 4,
        title: "Aspect particles 了, 过, 着",
        kind: ContentKind::Drill,
        level: 2,
        topic: "grammar",
    },
    ContentItem {
        id: 5,
        title: "Taking the subway in Beijing",
        kind: ContentKind::Reading,
        level: 2,
        topic: "travel",
    },
    ContentItem {
        id: 6,
        title: "The 把 construction",
        kind: ContentKind::Drill,
        level: 3,
        topic: "grammar",
    },
    ContentItem {
        id: 7,
        title: "A letter home",
        kind: ContentKind::Reading,
        level: 3,
        topic: "family",
    },
    ContentItem {
        id: 8,
        title: "Renting an apartment",
        kind: ContentKind::Lesson,
        level: 3,
        topic: "daily life",
    },
    ContentItem {
        id: 9,
        title: "Comparisons with 比 and 没有",
        kind: ContentKind::Drill,
        level: 3,
        topic: "grammar",
    },
    ContentItem {
        id: 10,
        title: "At the doctor's office",
        kind: ContentKind::Lesson,
        level: 4,
        topic: "health",
    },
    ContentItem {
        id: 11,
        title: "A visit to the hospital",
        kind: ContentKind::Reading,
        level: 4,
        topic: "health",
    },
    ContentItem {
        id: 12,
        title: "Complement of direction 起来, 下去",
        kind: ContentKind::Drill,
        level: 4,
        topic: "grammar",
    },
    ContentItem {
        id: 13,
        title: "Job interviews and resumes",
        kind: ContentKind::Lesson,
        level: 5,
        topic: "work",
    },
    ContentItem {
        id: 14,
        title: "An essay on city life",
        kind: ContentKind::Reading,
        level: 5,
        topic: "society",
    },
    ContentItem {
        id: 15,
        title: "Chengyu in everyday speech",
        kind: ContentKind::Reading,
        level: 6,
        topic: "culture",
    },
];
