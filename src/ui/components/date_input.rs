use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

use crate::milestones::DATE_FORMAT;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Segment-wise date entry that refuses dates before `min`.
pub struct DateInputState {
    pub date: NaiveDate,
    pub min: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
    /// Set once a typed segment produced an accepted date.
    pub dirty: bool,
}

impl DateInputState {
    /// Start from the existing value, or from the floor when the slot is empty.
    pub fn new(existing: Option<NaiveDate>, min: NaiveDate) -> Self {
        Self {
            date: existing.unwrap_or(min),
            min,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
            dirty: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.current_date_input.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    /// Accept `candidate` only if it is not earlier than the floor.
    fn try_set(&mut self, candidate: Option<NaiveDate>) -> bool {
        match candidate {
            Some(date) if date >= self.min => {
                self.date = date;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
                self.current_date_input.push(c);

                let width = if self.date_part == DatePart::Year { 4 } else { 2 };
                if self.current_date_input.len() < width {
                    return;
                }

                let candidate = match self.date_part {
                    DatePart::Year => self
                        .current_date_input
                        .parse::<i32>()
                        .ok()
                        .filter(|y| (1900..=2100).contains(y))
                        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day)),
                    DatePart::Month => self
                        .current_date_input
                        .parse::<u32>()
                        .ok()
                        .and_then(|m| NaiveDate::from_ymd_opt(year, m, day)),
                    DatePart::Day => self
                        .current_date_input
                        .parse::<u32>()
                        .ok()
                        .and_then(|d| NaiveDate::from_ymd_opt(year, month, d)),
                };
                self.try_set(candidate);
                self.current_date_input.clear();
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn value(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn get_display_string(&self) -> String {
        let date_str = self.value();
        if !self.editing {
            return date_str;
        }

        let (year, month, day) = (&date_str[0..4], &date_str[5..7], &date_str[8..10]);
        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}
