use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};
use sortli_core::{
    classify::Classification,
    model::{Disposal, WasteCategory},
};

use crate::app::{App, Field, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!(
        "sortli – {} · level {} · {} points",
        app.profile.name,
        app.profile.level(),
        app.profile.points
    ))
    .block(Block::default().borders(Borders::ALL).title("Sortli"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Capture => draw_capture(frame, app, *content_area),
        Screen::Review => draw_review(frame, app, *content_area),
        Screen::Progress => draw_progress(frame, app, *content_area),
        Screen::Centers => draw_centers(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::Capture => {
            "Type path · Tab switch field · ↑/↓ category · ←/→ disposal · Enter classify · Esc/Ctrl-C quit"
        }
        Screen::Review => "↑/↓ correct category · Enter log disposal · Esc/←/b back · Ctrl-C quit",
        Screen::Progress => "c nearby centers · Esc/←/b new entry · q/Ctrl-C quit",
        Screen::Centers => "Esc/←/b back to progress · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_capture(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // image path
            Constraint::Length(3), // weight + disposal
            Constraint::Min(0),    // manual categories
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [path_area, weight_area, list_area] = chunks else {
        return;
    };

    let path = Paragraph::new(app.image_path.as_str())
        .block(input_block(
            "Photo path (leave empty to pick a category)",
            app.focus == Field::ImagePath,
        ))
        .wrap(Wrap { trim: true });
    frame.render_widget(path, *path_area);

    let disposal = match app.disposal {
        Disposal::Proper => "sorted properly",
        Disposal::Improper => "not sorted",
    };
    let weight = Paragraph::new(format!("{} kg · {disposal}", app.weight_input))
        .block(input_block("Weight (kg) · disposal", app.focus == Field::Weight));
    frame.render_widget(weight, *weight_area);

    let items = app
        .categories
        .iter()
        .map(|category| ListItem::new(category.to_string()).style(category_style(*category)))
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Manual category (↑/↓)"),
        )
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.categories.is_empty() {
        state.select(Some(app.category_index));
    }
    frame.render_stateful_widget(list, *list_area, &mut state);
}

fn draw_review(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let (Some(classification), Some(result)) =
        (app.classification.as_ref(), app.reviewed_result())
    else {
        let paragraph = Paragraph::new("Nothing classified yet.")
            .block(Block::default().borders(Borders::ALL).title("Review"));
        frame.render_widget(paragraph, area);
        return;
    };

    let (source, source_color) = if app.category_override.is_some() {
        (
            format!("corrected by hand (was {})", classification.result().category),
            Color::Cyan,
        )
    } else {
        source_label(classification)
    };
    let weight = app.weight_kg().unwrap_or(0.0);
    let impact = app.service.estimate_carbon(result.category, weight);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Category:   "),
            Span::styled(result.category.to_string(), category_style(result.category)),
        ]),
        Line::from(format!("Confidence: {:.2}", result.confidence)),
        Line::from(vec![
            Span::raw("Source:     "),
            Span::styled(source, Style::default().fg(source_color)),
        ]),
        Line::from(format!("Weight:     {weight} kg")),
        Line::from(format!("Estimate:   {impact} if sorted properly")),
        Line::from(""),
        Line::from(Span::styled(
            "Tips",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(
        app.service
            .tips(result.category)
            .iter()
            .map(|tip| Line::from(format!("• {tip}"))),
    );

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Review classification (Enter to log)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_progress(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // level gauge
            Constraint::Length(9), // stats
            Constraint::Min(0),    // recent records
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [gauge_area, stats_area, records_area] = chunks else {
        return;
    };

    let progress = app.profile.level_progress();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Level {} → {}",
            app.profile.level(),
            app.profile.level() + 1
        )))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{progress:.0}%"));
    frame.render_widget(gauge, *gauge_area);

    let stats = app.service.stats(&app.profile);
    let footprint = app.service.footprint(&app.profile);
    let badges = if app.profile.badges.is_empty() {
        "none yet".to_owned()
    } else {
        app.profile
            .badges
            .iter()
            .map(|badge| badge.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    };

    let mut lines = Vec::new();
    if let Some(receipt) = &app.last_receipt {
        let mut summary = format!(
            "Last entry: +{} points, {}",
            receipt.record.points_earned, receipt.record.carbon
        );
        for badge in &receipt.new_badges {
            summary.push_str(" · new badge: ");
            summary.push_str(&badge.name);
        }
        lines.push(Line::from(Span::styled(
            summary,
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.extend([
        Line::from(format!(
            "Logged: {} entries, {:.2} kg ({:.2} kg recyclable)",
            stats.record_count, stats.total_waste_kg, stats.recyclable_waste_kg
        )),
        Line::from(format!(
            "Carbon: {:.2} kg saved, {:.2} kg emitted, net {:.2} kg",
            footprint.total_savings, footprint.total_emissions, footprint.net_impact
        )),
        Line::from(format!(
            "That is {:.2} trees for a year or {:.1} km not driven",
            footprint.trees_equivalent, footprint.car_km_equivalent
        )),
        Line::from(format!("Badges ({}): {badges}", stats.badge_count)),
    ]);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, *stats_area);

    let rows = app.profile.records.iter().rev().map(|record| {
        Row::new(vec![
            Cell::from(record.recorded_at.format("%d.%m. %H:%M").to_string()),
            Cell::from(record.category.to_string()),
            Cell::from(format!("{:.2} kg", record.weight_kg)),
            Cell::from(format!("+{}", record.points_earned)),
            Cell::from(format!("{:+.2}", record.carbon.kg_co2e())),
        ])
        .style(category_style(record.category))
    });

    let column_widths = [
        Constraint::Length(13),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["When", "Category", "Weight", "Points", "kg CO2e"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Recent entries"))
        .column_spacing(1);

    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(36)])
        .split(*records_area);
    let [table_area, breakdown_area] = bottom_chunks.as_ref() else {
        return;
    };

    frame.render_widget(table, *table_area);

    let mut breakdown: Vec<Line<'_>> = stats
        .by_category
        .iter()
        .map(|(category, count)| {
            Line::from(Span::styled(
                format!("{:<16} {count:>4}", category.to_string()),
                category_style(*category),
            ))
        })
        .collect();
    if !stats.monthly.is_empty() {
        breakdown.push(Line::from(""));
    }
    // Most recent months first
    breakdown.extend(stats.monthly.iter().rev().map(|(month, totals)| {
        Line::from(format!(
            "{month}  {:>6.2} kg  {:>+7.2} CO2e",
            totals.weight_kg, totals.carbon_kg
        ))
    }));

    let paragraph = Paragraph::new(breakdown).block(
        Block::default()
            .borders(Borders::ALL)
            .title("By category · by month"),
    );
    frame.render_widget(paragraph, *breakdown_area);
}

fn draw_centers(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = format!(
        "Recycling centers within {} km (Esc/←/b to go back)",
        app.search_radius_km
    );

    if app.is_loading {
        let paragraph = Paragraph::new("Searching…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    if app.centers.is_empty() {
        let paragraph = Paragraph::new(
            "No recycling centers found nearby. Without a places API key only the \
             [[centers]] listed in the config file are searched.",
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.centers.iter().map(|nearby| {
        let center = &nearby.center;
        let open = match center.open_now {
            Some(true) => "open",
            Some(false) => "closed",
            None => "",
        };
        let hours = center.hours.as_deref().unwrap_or(open);

        Row::new(vec![
            Cell::from(format!("{:.1} km", nearby.distance_km)),
            Cell::from(center.name.clone()),
            Cell::from(center.address.clone()),
            Cell::from(hours.to_owned()),
        ])
    });

    let column_widths = [
        Constraint::Length(9),
        Constraint::Length(28),
        Constraint::Min(20),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Distance", "Name", "Address", "Hours"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn source_label(classification: &Classification) -> (String, Color) {
    match classification {
        Classification::Manual(_) => ("picked by hand".to_owned(), Color::Reset),
        Classification::Annotated(_) => ("vision labels".to_owned(), Color::Green),
        Classification::Inconclusive { best_score, .. } => (
            format!("no confident match (best {best_score:.2})"),
            Color::Yellow,
        ),
        Classification::Degraded { reason, .. } => {
            (format!("local color guess: {reason}"), Color::Red)
        }
    }
}

fn category_style(category: WasteCategory) -> Style {
    let color = match category {
        WasteCategory::Plastic => Color::Yellow,
        WasteCategory::Paper => Color::Blue,
        WasteCategory::Glass => Color::Cyan,
        WasteCategory::Metal => Color::LightBlue,
        WasteCategory::Organic => Color::Green,
        WasteCategory::Electronic => Color::Magenta,
        WasteCategory::Hazardous => Color::Red,
        WasteCategory::NonRecyclable => Color::Gray,
    };
    Style::default().fg(color)
}
