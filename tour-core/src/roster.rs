//! Built-in campus scene: props and the six counseling-program characters.

use glam::Vec3;

use crate::error::Result;
use crate::replies::{ReplyBook, Topic};
use crate::types::Arena;
use crate::world::{CharacterSpec, CharacterTraits, Prop, PropKind, World};

fn traits(name: &str, role: &str, personality: &str, quirk: &str) -> CharacterTraits {
    CharacterTraits {
        name: name.to_string(),
        role: role.to_string(),
        personality: personality.to_string(),
        quirk: quirk.to_string(),
    }
}

/// Floor, boundary walls and furniture for an arena of the given size.
#[must_use]
pub fn campus_props(arena: Arena) -> Vec<Prop> {
    let h = arena.half_extent;
    let wall = 0.25;
    vec![
        Prop::new("floor", PropKind::Floor, Vec3::new(0.0, -0.05, 0.0), Vec3::new(h + wall, 0.05, h + wall)),
        Prop::new("north wall", PropKind::Wall, Vec3::new(0.0, 1.5, -h - wall), Vec3::new(h + wall, 1.5, wall)),
        Prop::new("south wall", PropKind::Wall, Vec3::new(0.0, 1.5, h + wall), Vec3::new(h + wall, 1.5, wall)),
        Prop::new("west wall", PropKind::Wall, Vec3::new(-h - wall, 1.5, 0.0), Vec3::new(wall, 1.5, h + wall)),
        Prop::new("east wall", PropKind::Wall, Vec3::new(h + wall, 1.5, 0.0), Vec3::new(wall, 1.5, h + wall)),
        Prop::new("reception desk", PropKind::Furniture, Vec3::new(0.0, 0.5, -3.0), Vec3::new(1.5, 0.5, 0.5)),
        Prop::new("counseling sofa", PropKind::Furniture, Vec3::new(-12.5, 0.4, -7.5), Vec3::new(1.2, 0.4, 0.5)),
        Prop::new("bookshelf", PropKind::Furniture, Vec3::new(12.0, 1.0, -11.5), Vec3::new(1.5, 1.0, 0.3)),
        Prop::new("whiteboard", PropKind::Furniture, Vec3::new(-6.0, 1.2, 11.5), Vec3::new(1.5, 0.8, 0.05)),
        Prop::new("data terminal", PropKind::Furniture, Vec3::new(2.0, 0.6, -14.0), Vec3::new(0.6, 0.6, 0.4)),
        Prop::new("potted plant", PropKind::Furniture, Vec3::new(15.5, 0.5, 15.5), Vec3::new(0.3, 0.5, 0.3)),
    ]
}

/// The default six characters with their curated reply books.
#[must_use]
pub fn campus_roster() -> Vec<CharacterSpec> {
    vec![
        CharacterSpec {
            traits: traits(
                "Ms. Han",
                "School Counselor",
                "warm, patient, a little bit of a worrier",
                "keeps a jar of peppermints on every desk",
            ),
            start: Vec3::new(-10.0, 0.0, -5.0),
            dancing: false,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I meet students one-on-one, run small support groups, and connect families with help outside school.",
                    "My job is to be the adult a student can talk to when nothing else feels safe to say out loud.",
                ])
                .with(Topic::DailyRoutine, &[
                    "Mornings are drop-in hours, afternoons are scheduled sessions, and paperwork eats whatever is left!",
                ])
                .with(Topic::Challenges, &[
                    "The hardest part is that students often come to me late, when a small worry has already grown big.",
                ])
                .with(Topic::Rewarding, &[
                    "When a student who wouldn't look at me in March waves at me in the hallway in June. That's the best.",
                ])
                .with(Topic::MentalHealth, &[
                    "Stress is normal, but you shouldn't carry it alone. Talking to someone early makes a huge difference.",
                    "Sleep, a bit of movement, and one person you trust. Those three go a long way for exam stress.",
                ])
                .with(Topic::Methods, &[
                    "I listen first. Advice lands much better once a student feels understood.",
                ]),
        },
        CharacterSpec {
            traits: traits(
                "Dr. Kwon",
                "Education Policy Researcher",
                "precise, thoughtful, quietly funny",
                "quotes page numbers from memory",
            ),
            start: Vec3::new(8.0, 0.0, -8.0),
            dancing: false,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I study which counseling policies actually change outcomes for students, and which only look good on paper.",
                ])
                .with(Topic::PolicyImportance, &[
                    "A counselor-to-student ratio sounds dry, but it decides whether a student waits a day or a month for help.",
                    "Good policy makes support the default instead of something a student has to fight for.",
                ])
                .with(Topic::CurrentProjects, &[
                    "Right now I'm comparing schools that added a second counselor against ones that didn't.",
                ])
                .with(Topic::DataUse, &[
                    "We combine attendance records with anonymous wellbeing surveys to spot schools that need support early.",
                ])
                .with(Topic::FutureOutlook, &[
                    "I expect counseling to move from crisis response toward prevention over the next few years.",
                ]),
        },
        CharacterSpec {
            traits: traits(
                "Mr. Park",
                "Homeroom Teacher",
                "energetic, upbeat, always running a little late",
                "carries three different coloured pens",
            ),
            start: Vec3::new(-6.0, 0.0, 9.0),
            dancing: false,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I see my students every single morning, so I'm usually the first to notice when something is off.",
                ])
                .with(Topic::DailyRoutine, &[
                    "Attendance, a quick check-in circle, then I teach history for the rest of the day.",
                ])
                .with(Topic::Challenges, &[
                    "Thirty students, one of me. Making sure nobody slips through the cracks is a daily puzzle.",
                ])
                .with(Topic::Methods, &[
                    "Our check-in circle takes five minutes and tells me more than any test does.",
                ]),
        },
        CharacterSpec {
            traits: traits(
                "Jiwoo",
                "Student Ambassador",
                "cheerful, chatty, proud of the school",
                "breaks into a little dance when excited",
            ),
            start: Vec3::new(10.0, 0.0, 6.0),
            dancing: true,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I show new students around and tell them where to go when they need someone to talk to!",
                ])
                .with(Topic::Rewarding, &[
                    "Seeing a nervous first-year make friends by the end of the week. Every time!",
                ])
                .with(Topic::MentalHealth, &[
                    "Honestly? Visiting the counseling room before exams helped me so much. No shame in it.",
                ])
                .with(Topic::FutureOutlook, &[
                    "I want to study psychology next year so I can do this kind of work for real.",
                ]),
        },
        CharacterSpec {
            traits: traits(
                "Ms. Lee",
                "Data Analyst",
                "calm, methodical, loves a good chart",
                "names her spreadsheets after constellations",
            ),
            start: Vec3::new(1.0, 0.0, -12.0),
            dancing: false,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I turn survey results and program records into something counselors can actually act on.",
                ])
                .with(Topic::DataUse, &[
                    "We track how quickly students get a first appointment. It's the single most telling statistic we have.",
                    "Survey data is anonymous and aggregated; we look at patterns, never at individual answers.",
                ])
                .with(Topic::CurrentProjects, &[
                    "I'm building a dashboard that shows wait times per school, updated weekly.",
                ])
                .with(Topic::Methods, &[
                    "Start with a question, then find the data, never the other way round.",
                ]),
        },
        CharacterSpec {
            traits: traits(
                "Director Choi",
                "Program Director",
                "steady, encouraging, big-picture thinker",
                "remembers every student's name",
            ),
            start: Vec3::new(-14.0, 0.0, 12.0),
            dancing: false,
            book: ReplyBook::new()
                .with(Topic::Role, &[
                    "I coordinate the whole program: counselors, teachers, researchers, and the budget that keeps it running.",
                ])
                .with(Topic::PolicyImportance, &[
                    "Policy is how a good idea in one school becomes a guarantee in every school.",
                ])
                .with(Topic::Challenges, &[
                    "Funding. Every year I have to prove again that prevention costs less than crisis.",
                ])
                .with(Topic::FutureOutlook, &[
                    "My goal is a counselor every student knows by name, in every school in the district.",
                ]),
        },
    ]
}

/// A world populated with the campus props and roster.
///
/// # Errors
/// Only fails if `arena` is too small to hold the default roster.
pub fn campus_world(arena: Arena) -> Result<World> {
    World::new(arena, campus_props(arena), campus_roster())
}
