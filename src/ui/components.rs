//! Panels drawn by the cleaning TUI

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress};
use crate::clean::KindReport;
use crate::schema::EntityKind;

const ACCENT: Color = Color::Yellow;

/// Current phase plus a free-form detail line
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::FetchingReferences,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = if self.phase == Phase::Complete {
            Color::Green
        } else {
            ACCENT
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let marker = match self.phase {
            Phase::FetchingReferences => "↓",
            Phase::Filtering => "✗",
            Phase::Correcting => "✎",
            Phase::Normalizing => "Aa",
            Phase::Collapsing => "⇊",
            Phase::Complete => "✓",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", marker), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" pokedex-sqlite ")
            .border_style(Style::default().fg(ACCENT));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Gauge across every kind/stage step of the run
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(ACCENT));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = format!(
            "{} ({}/{} steps)",
            progress.label, progress.current, progress.total
        );
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(ACCENT).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);
        frame.render_widget(gauge, area);
    }
}

/// One row of counts per finished kind
pub struct KindsPanel {
    rows: Vec<(EntityKind, KindReport)>,
}

impl KindsPanel {
    /// Header, four kinds and borders
    pub const HEIGHT: u16 = 7;

    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn record(&mut self, kind: EntityKind, report: KindReport) {
        match self.rows.iter_mut().find(|(k, _)| *k == kind) {
            Some(row) => row.1 = report,
            None => self.rows.push((kind, report)),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["kind", "removed", "corrected", "recased", "merged", "remapped"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.rows.iter().map(|(kind, r)| {
            Row::new([
                kind.to_string(),
                r.removed.to_string(),
                r.corrected.to_string(),
                r.normalized.to_string(),
                r.collapsed.to_string(),
                r.remapped.to_string(),
            ])
        });

        let widths = [
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Results ")
                .border_style(Style::default().fg(ACCENT)),
        );
        frame.render_widget(table, area);
    }
}

/// Most recent activity, newest last
pub struct LogPanel {
    entries: VecDeque<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: 200,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push_back(message.into());
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, entry)| {
                let color = if i == newest { Color::White } else { Color::DarkGray };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(ACCENT));
        frame.render_widget(List::new(items).block(block), area);
    }
}
