//! Withdraw and deposit screens

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use atm_core::transaction::AmountEntry;
use atm_core::{FlowState, TransactionFlow, TransactionKind};

use super::screen_block;
use crate::ui::Theme;

pub fn draw(frame: &mut Frame, area: Rect, flow: &TransactionFlow, theme: &Theme) {
    let title = match flow.kind() {
        TransactionKind::Withdraw => "Withdraw",
        TransactionKind::Deposit => "Deposit",
    };
    let block = screen_block(title, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Limits
            Constraint::Length(2), // Prompt
            Constraint::Length(2), // Input or amount
            Constraint::Length(2), // Rejection
            Constraint::Min(0),
        ])
        .split(inner);

    if let Some(info) = flow.info() {
        let mut lines = vec![
            limit_line("Balance", info.balance, theme),
            limit_line("Daily limit left", info.remaining_daily_limit(), theme),
        ];
        if flow.kind() == TransactionKind::Withdraw {
            lines.push(limit_line("Cash in machine", info.atm_available, theme));
        }
        frame.render_widget(Paragraph::new(lines), chunks[0]);
    }

    let (prompt, value) = describe(flow);
    frame.render_widget(
        Paragraph::new(prompt)
            .style(prompt_style(flow.state(), theme))
            .alignment(Alignment::Center),
        chunks[1],
    );
    if let Some(value) = value {
        frame.render_widget(
            Paragraph::new(value)
                .style(theme.amount())
                .alignment(Alignment::Center),
            chunks[2],
        );
    }

    if let Some(rejection) = flow.rejection() {
        frame.render_widget(
            Paragraph::new(rejection.to_string())
                .style(theme.danger())
                .alignment(Alignment::Center),
            chunks[3],
        );
    }
}

fn limit_line(label: &str, amount: u64, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), theme.text_muted()),
        Span::styled(format!("${}", amount), theme.text()),
    ])
}

fn prompt_style(state: &FlowState, theme: &Theme) -> Style {
    match state {
        FlowState::Success { .. } => theme.success(),
        FlowState::Error { .. } => theme.danger(),
        _ => theme.text_secondary(),
    }
}

/// Prompt line and the value line under it
fn describe(flow: &TransactionFlow) -> (String, Option<String>) {
    let verb = match flow.kind() {
        TransactionKind::Withdraw => "withdraw",
        TransactionKind::Deposit => "deposit",
    };
    match flow.state() {
        FlowState::Loading => ("Loading...".to_string(), None),
        FlowState::EnteringAccount => (
            "Enter the account number to deposit to".to_string(),
            Some(placeholder(flow.account_input(), flow.rules().entry_digits)),
        ),
        FlowState::Ready | FlowState::EnteringAmount(AmountEntry::Preset(_)) => {
            let prompt = match flow.target_account() {
                Some(account) => format!("Choose an amount to {} to {}", verb, account),
                None => format!("Choose an amount to {}", verb),
            };
            (prompt, None)
        }
        FlowState::EnteringAmount(AmountEntry::Custom(digits)) => (
            format!("Type the amount to {} and press Enter", verb),
            Some(format!("${}", digits)),
        ),
        FlowState::Confirming(pending) => {
            let prompt = match &pending.target_account {
                Some(account) => format!("Confirm {} to account {}", verb, account),
                None => format!("Confirm {}", verb),
            };
            (prompt, Some(format!("${}", pending.amount)))
        }
        FlowState::Committing(pending) => (
            "Processing...".to_string(),
            Some(format!("${}", pending.amount)),
        ),
        FlowState::Success { amount } => (
            match flow.kind() {
                TransactionKind::Withdraw => "Please take your cash".to_string(),
                TransactionKind::Deposit => "Deposit complete".to_string(),
            },
            Some(format!("${}", amount)),
        ),
        FlowState::Error { message, .. } => (message.clone(), None),
    }
}

/// Typed digits padded with underscores to the expected length
fn placeholder(input: &str, len: usize) -> String {
    let missing = len.saturating_sub(input.len());
    format!("{}{}", input, "_".repeat(missing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_pads() {
        assert_eq!(placeholder("12", 6), "12____");
        assert_eq!(placeholder("123456", 6), "123456");
    }
}
