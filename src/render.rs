use crate::data::{Slot, Timetable, TimetableInput};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn day_name(day: u32) -> String {
    DAY_NAMES
        .get(day as usize)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("Day {}", day))
}

fn headers(input: &TimetableInput) -> Vec<String> {
    std::iter::once("Hour".to_string())
        .chain((0..input.num_days).map(day_name))
        .collect()
}

/// Left-aligned columns, ` | ` between cells and a `-+-` rule under the header.
pub fn render_table(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let border = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-");
    let mut out = format!("\n{}\n{}\n{}\n", title, line(headers), border);
    for row in rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

/// One table per group; cells read `Subject (Teacher)`.
pub fn render_group_timetables(input: &TimetableInput, timetable: &Timetable) -> String {
    let headers = headers(input);
    input
        .groups
        .iter()
        .map(|group| {
            let rows: Vec<Vec<String>> = (0..input.num_hours)
                .map(|hour| {
                    let mut row = vec![format!("Hour {}", hour)];
                    row.extend((0..input.num_days).map(|day| {
                        timetable
                            .lesson_at(&group.id, Slot { day, hour })
                            .map(|l| format!("{} ({})", l.subject, l.teacher))
                            .unwrap_or_else(|| "-".to_string())
                    }));
                    row
                })
                .collect();
            render_table(&format!("Schedule for {}", group.id), &headers, &rows)
        })
        .collect()
}

/// One table per teacher; cells read `Subject (Group)`.
pub fn render_teacher_timetables(input: &TimetableInput, timetable: &Timetable) -> String {
    let headers = headers(input);
    input
        .teachers
        .iter()
        .map(|teacher| {
            let rows: Vec<Vec<String>> = (0..input.num_hours)
                .map(|hour| {
                    let mut row = vec![format!("Hour {}", hour)];
                    row.extend((0..input.num_days).map(|day| {
                        timetable
                            .lessons_of_teacher(&teacher.name)
                            .find(|l| l.slot() == Slot { day, hour })
                            .map(|l| format!("{} ({})", l.subject, l.group))
                            .unwrap_or_else(|| "-".to_string())
                    }));
                    row
                })
                .collect();
            render_table(&format!("Schedule for {}", teacher.name), &headers, &rows)
        })
        .collect()
}
