use crate::config::validate;
use crate::data::{
    Day, Hour, Lesson, Objective, Slot, SolveOutcome, Timetable, TimetableInput,
};
use crate::error::ConfigurationError;
use crate::verify::verify;
use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver,
};
use itertools::Itertools;
use log::{info, trace, warn};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Index of one assignment variable: group, subject and teacher are positions
/// in the input vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarKey {
    pub group: usize,
    pub subject: usize,
    pub teacher: usize,
    pub slot: Slot,
}

impl VarKey {
    fn lesson(&self, input: &TimetableInput) -> Lesson {
        Lesson {
            group: input.groups[self.group].id.clone(),
            day: self.slot.day,
            hour: self.slot.hour,
            subject: input.subjects[self.subject].name.clone(),
            teacher: input.teachers[self.teacher].name.clone(),
        }
    }
}

/// Builds the timetable model, hands it to HiGHS and classifies the result.
pub fn solve(input: &TimetableInput) -> Result<SolveOutcome, ConfigurationError> {
    validate(input)?;
    let start_time = Instant::now();
    let options = &input.solver;

    info!(
        "Setting up timetable model with {} groups, {} subjects, {} teachers on a {}x{} grid...",
        input.groups.len(),
        input.subjects.len(),
        input.teachers.len(),
        input.num_days,
        input.num_hours
    );

    // x_gstdh = 1 if teacher t teaches subject s to group g on day d, hour h
    //           0 otherwise
    let keys = assignment_keys(input);
    trace!(
        "Generated {} assignment variables out of a theoretical maximum of {}.",
        keys.len(),
        input.groups.len()
            * input.subjects.len()
            * input.teachers.len()
            * (input.num_days * input.num_hours) as usize
    );

    if let Some((group, subject)) = unstaffed_requirement(input, &keys) {
        warn!(
            "Group {} needs {} hours of {} but no qualified teacher exists.",
            input.groups[group].id, input.subjects[subject].weekly_hours, input.subjects[subject].name
        );
        return Ok(SolveOutcome::Infeasible);
    }
    if keys.is_empty() {
        info!("Nothing to schedule.");
        return Ok(SolveOutcome::Feasible(Timetable::default()));
    }

    let mut problem = ProblemVariables::new();
    let assignment_vars_vec = problem.add_vector(variable().binary(), keys.len());
    let assignments: BTreeMap<VarKey, Variable> =
        keys.iter().copied().zip(assignment_vars_vec).collect();

    // one block-start indicator per hour for every (group, subject, day)
    // that could be taught more than once that day
    let mut block_starts: BTreeMap<(usize, usize, Day), Vec<Variable>> = BTreeMap::new();
    if options.contiguous_blocks && input.num_hours > 1 {
        for key in assignments.keys() {
            if input.subjects[key.subject].max_hours_per_day < 2 {
                continue;
            }
            block_starts
                .entry((key.group, key.subject, key.slot.day))
                .or_insert_with(|| {
                    problem.add_vector(variable().binary(), input.num_hours as usize)
                });
        }
    }

    let objective: Expression = match options.objective {
        Objective::Feasibility => sum_of(&[]),
        Objective::PreferEarlyHours => assignments
            .iter()
            .map(|(key, var)| f64::from(key.slot.hour) * Expression::from(*var))
            .sum(),
    };
    info!("Objective set to {:?}.", options.objective);

    let mut model = problem
        .minimise(objective)
        .using(default_solver)
        .set_option("threads", options.threads)
        .set_option("random_seed", options.random_seed)
        .set_option("log_to_console", options.log_to_console);
    if let Some(limit) = options.time_limit_secs {
        model = model.set_option("time_limit", limit);
    }

    info!("Adding 'one lesson per group and slot' constraints...");
    let group_slot_rows = rows(&assignments, |k| (k.group, k.slot));
    for (_, row) in group_slot_rows.into_iter().sorted_by_key(|(k, _)| *k) {
        if row.len() > 1 {
            let occupied = sum_of(&row);
            model.add_constraint(constraint!(occupied <= 1));
        }
    }

    info!("Adding 'one lesson per teacher and slot' constraints...");
    let teacher_slot_rows = rows(&assignments, |k| (k.teacher, k.slot));
    for (_, row) in teacher_slot_rows.into_iter().sorted_by_key(|(k, _)| *k) {
        if row.len() > 1 {
            let busy = sum_of(&row);
            model.add_constraint(constraint!(busy <= 1));
        }
    }

    info!("Adding 'weekly hours per group and subject' constraints...");
    let group_subject_rows = rows(&assignments, |k| (k.group, k.subject));
    for ((_, subject), row) in group_subject_rows.into_iter().sorted_by_key(|(k, _)| *k) {
        let taught = sum_of(&row);
        let required = f64::from(input.subjects[subject].weekly_hours);
        model.add_constraint(constraint!(taught == required));
    }

    info!("Adding 'max hours per day' constraints...");
    let group_subject_day_rows = rows(&assignments, |k| (k.group, k.subject, k.slot.day));
    for ((_, subject, _), row) in group_subject_day_rows.into_iter().sorted_by_key(|(k, _)| *k) {
        let cap = input.subjects[subject].max_hours_per_day;
        // rows that cannot exceed the cap are left out
        if row.len() > cap as usize {
            let daily = sum_of(&row);
            model.add_constraint(constraint!(daily <= f64::from(cap)));
        }
    }

    info!("Adding 'max hours per week' constraints...");
    let teacher_rows = rows(&assignments, |k| k.teacher);
    for (teacher, row) in teacher_rows.into_iter().sorted_by_key(|(k, _)| *k) {
        let cap = input.teachers[teacher].max_hours_week;
        if row.len() > cap as usize {
            let weekly = sum_of(&row);
            model.add_constraint(constraint!(weekly <= f64::from(cap)));
        }
    }

    if !block_starts.is_empty() {
        info!("Adding 'contiguous daily block' constraints...");
        let hour_rows = rows(&assignments, |k| (k.group, k.subject, k.slot));
        for (&(group, subject, day), starts) in &block_starts {
            let load = |hour: Hour| -> Expression {
                hour_rows
                    .get(&(group, subject, Slot { day, hour }))
                    .map(|row| sum_of(row))
                    .unwrap_or_else(|| sum_of(&[]))
            };
            // a block starts at h whenever h is taught and h-1 is not
            for (hour, start) in starts.iter().enumerate() {
                let hour = hour as Hour;
                let rise = if hour == 0 {
                    load(0)
                } else {
                    load(hour) - load(hour - 1)
                };
                model.add_constraint(constraint!(*start >= rise));
            }
            let blocks = sum_of(starts);
            model.add_constraint(constraint!(blocks <= 1));
        }
    }

    info!("Starting HiGHS...");
    let solution = match model.solve() {
        Ok(s) => s,
        Err(e) => {
            warn!("Solver stopped after {:.2?}: {}", start_time.elapsed(), e);
            return Ok(unsolved_outcome(e));
        }
    };
    info!("Solver finished in {:.2?}", start_time.elapsed());

    let lessons = assignments
        .iter()
        .filter(|(_, var)| solution.value(**var) > 0.9)
        .map(|(key, _)| key.lesson(input))
        .collect();

    Ok(classify(input, Timetable::new(lessons)))
}

/// Only a verified timetable is reported as feasible. Anything else coming back
/// from the solver (e.g. an empty incumbent after the time limit) is unknown.
pub fn classify(input: &TimetableInput, timetable: Timetable) -> SolveOutcome {
    let violations = verify(input, &timetable);
    if violations.is_empty() {
        info!("Timetable with {} lessons passed verification.", timetable.len());
        return SolveOutcome::Feasible(timetable);
    }
    for v in &violations {
        warn!("{}", v);
    }
    SolveOutcome::Unknown {
        reason: format!(
            "solver stopped without a valid timetable ({} violated constraints, first: {})",
            violations.len(),
            violations[0]
        ),
    }
}

/// Infeasibility is proven by the solver; every other failure leaves the
/// question open.
fn unsolved_outcome(error: ResolutionError) -> SolveOutcome {
    match error {
        ResolutionError::Infeasible => SolveOutcome::Infeasible,
        e => SolveOutcome::Unknown {
            reason: format!("solver error: {}", e),
        },
    }
}

/// Every qualified (group, subject, teacher, slot) combination, in a stable order.
pub fn assignment_keys(input: &TimetableInput) -> Vec<VarKey> {
    let mut keys = Vec::new();
    for (g, group) in input.groups.iter().enumerate() {
        for (s, subject) in input.subjects.iter().enumerate() {
            if !subject.applies_to(group) {
                continue;
            }
            for (t, teacher) in input.teachers.iter().enumerate() {
                if !teacher.is_qualified_for(subject) {
                    continue;
                }
                keys.extend(input.slots().map(|slot| VarKey {
                    group: g,
                    subject: s,
                    teacher: t,
                    slot,
                }));
            }
        }
    }
    keys
}

// a (group, subject) pair that needs hours but has no variable to carry them
fn unstaffed_requirement(input: &TimetableInput, keys: &[VarKey]) -> Option<(usize, usize)> {
    let staffed: HashMap<(usize, usize), usize> = keys.iter().map(|k| (k.group, k.subject)).counts();
    input.groups.iter().enumerate().find_map(|(g, group)| {
        input
            .subjects
            .iter()
            .enumerate()
            .find(|(s, subject)| {
                subject.applies_to(group)
                    && subject.weekly_hours > 0
                    && !staffed.contains_key(&(g, *s))
            })
            .map(|(s, _)| (g, s))
    })
}

fn rows<K, F>(assignments: &BTreeMap<VarKey, Variable>, key: F) -> HashMap<K, Vec<Variable>>
where
    K: std::hash::Hash + Eq,
    F: Fn(&VarKey) -> K,
{
    assignments
        .iter()
        .map(|(k, var)| (key(k), *var))
        .into_group_map()
}

fn sum_of(vars: &[Variable]) -> Expression {
    vars.iter().copied().sum()
}
