//! Filter/sort engine producing the derived task view.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use time::{OffsetDateTime, UtcOffset};

use crate::criteria::{FilterCriteria, SortDirection, SortKey};
use crate::due::{end_of_day, parse_due};
use crate::text_matcher::TextMatcher;
use crate::Task;

/// Pure function from (tasks, criteria) to an ordered task sequence.
///
/// `offset` is the local zone used for naive due dates and for widening the
/// upper range bound to the end of its calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEngine {
    offset: UtcOffset,
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl ViewEngine {
    /// Create an engine interpreting calendar days in `offset`.
    #[must_use]
    pub const fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Local offset used by this engine.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Filter then stably sort `tasks` according to `criteria`.
    #[must_use]
    pub fn apply(&self, tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
        let matcher = TextMatcher::new(&criteria.search);
        let end = criteria
            .due_date_range
            .end
            .map(|bound| end_of_day(bound, self.offset).unwrap_or(bound));

        let mut selected: Vec<Task> = tasks
            .iter()
            .filter(|task| self.accepts(task, criteria, matcher.as_ref(), end))
            .cloned()
            .collect();

        // `sort_by` is stable, so equal keys keep their input order in both directions.
        selected.sort_by(|a, b| self.compare(a, b, criteria.sort_by, criteria.sort_direction));
        selected
    }

    fn accepts(
        &self,
        task: &Task,
        criteria: &FilterCriteria,
        matcher: Option<&TextMatcher>,
        end: Option<OffsetDateTime>,
    ) -> bool {
        if let Some(matcher) = matcher
            && !matcher.matches(task)
        {
            return false;
        }
        if !criteria.status.is_empty() && !criteria.status.contains(&task.status) {
            return false;
        }
        if !criteria.priority.is_empty() && !criteria.priority.contains(&task.priority) {
            return false;
        }

        let range = &criteria.due_date_range;
        if range.is_open() {
            return true;
        }
        let Some(due) = self.due(task) else {
            return false;
        };
        if let Some(start) = range.start
            && due < start
        {
            return false;
        }
        if let Some(end) = end
            && due > end
        {
            return false;
        }
        true
    }

    fn due(&self, task: &Task) -> Option<OffsetDateTime> {
        task.due_date.as_deref().and_then(|raw| parse_due(raw, self.offset))
    }

    fn compare(&self, a: &Task, b: &Task, key: SortKey, direction: SortDirection) -> Ordering {
        match key {
            SortKey::DueDate => match (self.due(a), self.due(b)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => directed(left.cmp(&right), direction),
            },
            SortKey::Priority => directed(a.priority.weight().cmp(&b.priority.weight()), direction),
            SortKey::Status => directed(a.status.weight().cmp(&b.status.weight()), direction),
            SortKey::Title => directed(compare_titles(&a.title, &b.title), direction),
        }
    }
}

/// Run the engine with UTC as the local zone.
#[must_use]
pub fn apply(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    ViewEngine::default().apply(tasks, criteria)
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    if direction.multiplier() < 0 {
        ordering.reverse()
    } else {
        ordering
    }
}

thread_local! {
    static TITLE_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Root-locale collation (tertiary strength, so lowercase sorts before uppercase),
/// then code points for titles the collator considers equal.
fn compare_titles(a: &str, b: &str) -> Ordering {
    TITLE_COLLATOR
        .with(|collator| {
            collator.as_ref().map_or_else(
                || a.to_lowercase().cmp(&b.to_lowercase()),
                |collator| collator.compare(a, b),
            )
        })
        .then_with(|| a.cmp(b))
}
