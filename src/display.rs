//! Text shown for machines on the dashboard.

use std::fmt::Write;

use crate::types::{LaundryRoom, LaundrySnapshot, Machine, MachineKind, MachineStatus};

pub fn status_label(status: MachineStatus) -> &'static str {
    match status {
        MachineStatus::Available => "Available",
        MachineStatus::InUse => "In Use",
        MachineStatus::Finishing => "Finishing Soon",
        MachineStatus::Broken => "Out of Order",
    }
}

/// Hex colour of the status indicator strip
pub fn status_color(status: MachineStatus) -> &'static str {
    match status {
        MachineStatus::Available => "#10B981",
        MachineStatus::InUse => "#EF4444",
        MachineStatus::Finishing => "#F59E0B",
        MachineStatus::Broken => "#6B7280",
    }
}

/// `MM:SS` countdown. Minutes are not wrapped, so 2700 renders as `45:00`.
pub fn format_time(seconds: u32) -> String {
    if seconds == 0 {
        return "00:00".to_string();
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Label on the machine's button
pub fn action_label(status: MachineStatus) -> &'static str {
    match status {
        MachineStatus::Available => "Start",
        _ => "Report",
    }
}

pub fn action_enabled(status: MachineStatus) -> bool {
    status != MachineStatus::Broken
}

/// e.g. `WASHER #1`
pub fn machine_title(machine: &Machine) -> String {
    let kind = match machine.kind {
        MachineKind::Washer => "WASHER",
        MachineKind::Dryer => "DRYER",
    };
    format!("{kind} #{}", machine.id)
}

/// One dashboard line for a machine
pub fn machine_line(machine: &Machine) -> String {
    let mut line = format!("{:<11} {:<15}", machine_title(machine), status_label(machine.status));
    if machine.status.is_running() {
        let _ = write!(line, " {}", format_time(machine.timer));
    } else {
        line.push_str("      ");
    }
    if action_enabled(machine.status) {
        let _ = write!(line, "  [{}]", action_label(machine.status));
    }
    line.trim_end().to_string()
}

pub fn render_room(room: &LaundryRoom) -> String {
    let mut out = format!(
        "{} ({} washers, {} dryers free)\n",
        room.name,
        room.available_count(MachineKind::Washer),
        room.available_count(MachineKind::Dryer)
    );
    for machine in &room.machines {
        out.push_str("  ");
        out.push_str(&machine_line(machine));
        out.push('\n');
    }
    out
}

pub fn render_snapshot(snapshot: &LaundrySnapshot) -> String {
    snapshot
        .rooms
        .iter()
        .map(render_room)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(240), "04:00");
        assert_eq!(format_time(1800), "30:00");
        assert_eq!(format_time(2700), "45:00");
        assert_eq!(format_time(6001), "100:01");
    }

    #[test]
    fn test_labels() {
        assert_eq!(status_label(MachineStatus::InUse), "In Use");
        assert_eq!(status_label(MachineStatus::Finishing), "Finishing Soon");
        assert_eq!(status_label(MachineStatus::Broken), "Out of Order");
        assert_eq!(action_label(MachineStatus::Available), "Start");
        assert_eq!(action_label(MachineStatus::Finishing), "Report");
        assert!(!action_enabled(MachineStatus::Broken));
    }

    #[test]
    fn test_machine_line_shows_timer_only_while_running() {
        let running = Machine::new(7, MachineKind::Dryer, MachineStatus::Finishing, 240);
        let line = machine_line(&running);
        assert!(line.starts_with("DRYER #7"));
        assert!(line.contains("Finishing Soon"));
        assert!(line.contains("04:00"));
        assert!(line.ends_with("[Report]"));

        let broken = Machine::new(3, MachineKind::Washer, MachineStatus::Broken, 0);
        let line = machine_line(&broken);
        assert!(line.contains("Out of Order"));
        assert!(!line.contains("00:00"));
        assert!(!line.contains('['));
    }

    #[test]
    fn test_render_room_header_counts_free_machines() {
        let room = LaundryRoom::new(
            "r",
            "Pioneer Point",
            vec![
                Machine::available(9, MachineKind::Washer),
                Machine::new(11, MachineKind::Dryer, MachineStatus::InUse, 1200),
            ],
        );
        let text = render_room(&room);
        assert!(text.starts_with("Pioneer Point (1 washers, 0 dryers free)"));
        assert!(text.contains("WASHER #9"));
        assert!(text.contains("20:00"));
    }
}
