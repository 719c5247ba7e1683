use crate::data::{ConstraintViolation, Day, Slot, Timetable, TimetableInput};
use itertools::Itertools;
use std::collections::HashMap;

fn violation(constraint_type: &str, description: String) -> ConstraintViolation {
    ConstraintViolation {
        constraint_type: constraint_type.to_string(),
        description,
    }
}

/// Checks every hard constraint of the model against a finished timetable.
/// An empty result means the timetable is valid.
pub fn verify(input: &TimetableInput, timetable: &Timetable) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    // lessons must reference declared entities inside the grid
    for lesson in &timetable.lessons {
        if lesson.day >= input.num_days || lesson.hour >= input.num_hours {
            violations.push(violation(
                "Slot Outside Grid",
                format!("Group {} has a lesson at {}", lesson.group, lesson.slot()),
            ));
        }
        let group = input.group(&lesson.group);
        let subject = input.subject(&lesson.subject);
        let teacher = input.teacher(&lesson.teacher);
        let (Some(group), Some(subject), Some(teacher)) = (group, subject, teacher) else {
            violations.push(violation(
                "Unknown Entity",
                format!(
                    "Lesson {} / {} / {} references an undeclared entity",
                    lesson.group, lesson.subject, lesson.teacher
                ),
            ));
            continue;
        };
        if !subject.applies_to(group) {
            violations.push(violation(
                "Subject Not In Course",
                format!("Group {} does not take {}", group.id, subject.name),
            ));
        }
        if !teacher.is_qualified_for(subject) {
            violations.push(violation(
                "Teacher Qualification",
                format!("{} is not qualified to teach {}", teacher.name, subject.name),
            ));
        }
    }

    // no group double-booking
    let by_group_slot: HashMap<(&str, Slot), usize> = timetable
        .lessons
        .iter()
        .map(|l| (l.group.as_str(), l.slot()))
        .counts();
    for ((group, slot), count) in by_group_slot.into_iter().sorted() {
        if count > 1 {
            violations.push(violation(
                "Group Overlap",
                format!("Group {} has {} lessons at {}", group, count, slot),
            ));
        }
    }

    // no teacher double-booking
    let by_teacher_slot: HashMap<(&str, Slot), usize> = timetable
        .lessons
        .iter()
        .map(|l| (l.teacher.as_str(), l.slot()))
        .counts();
    for ((teacher, slot), count) in by_teacher_slot.into_iter().sorted() {
        if count > 1 {
            violations.push(violation(
                "Teacher Overlap",
                format!("{} teaches {} lessons at {}", teacher, count, slot),
            ));
        }
    }

    // exact weekly hours per group and subject
    let by_group_subject: HashMap<(&str, &str), usize> = timetable
        .lessons
        .iter()
        .map(|l| (l.group.as_str(), l.subject.as_str()))
        .counts();
    for group in &input.groups {
        for subject in input.subjects.iter().filter(|s| s.applies_to(group)) {
            let taught = by_group_subject
                .get(&(group.id.as_str(), subject.name.as_str()))
                .copied()
                .unwrap_or(0);
            if taught != subject.weekly_hours as usize {
                violations.push(violation(
                    "Weekly Hours",
                    format!(
                        "Group {} has {} hours of {}, {} required",
                        group.id, taught, subject.name, subject.weekly_hours
                    ),
                ));
            }
        }
    }

    // daily cap per group and subject, and contiguity when enabled
    let by_group_subject_day: HashMap<(&str, &str, Day), Vec<u32>> = timetable
        .lessons
        .iter()
        .map(|l| ((l.group.as_str(), l.subject.as_str(), l.day), l.hour))
        .into_group_map();
    for ((group, subject_name, day), mut hours) in by_group_subject_day.into_iter().sorted() {
        let Some(subject) = input.subject(subject_name) else {
            continue;
        };
        if hours.len() > subject.max_hours_per_day as usize {
            violations.push(violation(
                "Max Hours Per Day",
                format!(
                    "Group {} has {} hours of {} on day {}, at most {} allowed",
                    group,
                    hours.len(),
                    subject.name,
                    day,
                    subject.max_hours_per_day
                ),
            ));
        }
        if input.solver.contiguous_blocks {
            hours.sort_unstable();
            hours.dedup();
            if hours.windows(2).any(|w| w[1] != w[0] + 1) {
                violations.push(violation(
                    "Contiguous Block",
                    format!(
                        "Group {} has non-consecutive {} hours on day {}: {:?}",
                        group, subject.name, day, hours
                    ),
                ));
            }
        }
    }

    // weekly cap per teacher
    for teacher in &input.teachers {
        let taught = timetable.lessons_of_teacher(&teacher.name).count();
        if taught > teacher.max_hours_week as usize {
            violations.push(violation(
                "Max Hours Per Week",
                format!(
                    "{} teaches {} hours, at most {} allowed",
                    teacher.name, taught, teacher.max_hours_week
                ),
            ));
        }
    }

    violations
}
