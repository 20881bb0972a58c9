//! Command handlers for the CLI
//!
//! Each handler is a thin composition of the library components: it asks
//! the view composer whether the screen is reachable (and whether to draw
//! the chrome), then drives the session store, hydrator, API client, and
//! form state machine. Handlers own the cancellation token for their
//! fetches; dropping out early cancels the request instead of applying a
//! late response.

use std::sync::Arc;

use colored::Colorize;
use prettytable::{row, Table};
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{CisError, Result};
use crate::evaluation::{EvaluationForm, FormState, SUCCESS_DISPLAY_WINDOW};
use crate::roster::sort_classes;
use crate::session::{ExpiryMonitor, ProfileHydrator, SessionStore};
use crate::view::{self, compose_view};

/// Shared wiring for all command handlers.
pub struct AppContext {
    pub config: Config,
    pub api: ApiClient,
    pub store: Arc<SessionStore>,
    pub hydrator: ProfileHydrator,
    pub monitor: Arc<ExpiryMonitor>,
}

impl AppContext {
    /// Compose the view for a navigation path, printing the chrome header
    /// when appropriate.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Auth`] when the path redirects to the login
    /// page, i.e. the command needs a session that is not there.
    fn enter(&self, path: &str) -> Result<bool> {
        // One synchronous check on entry; the background timer covers
        // long-running interactive commands.
        self.monitor.check_now();

        let decision = compose_view(path, self.store.is_authenticated());
        if decision.redirect_to == Some(view::LOGIN_PATH) {
            return Err(
                CisError::Auth("not logged in; run `ciseval login` first".to_string()).into(),
            );
        }
        if decision.show_chrome {
            println!("{}", "CIS — Student Evaluation Platform".bold());
            println!();
        }
        Ok(decision.show_chrome)
    }

    /// Print the chrome footer when the header was shown.
    fn leave(&self, chrome: bool) {
        if chrome {
            println!();
            println!("{}", "CIS © school evaluation service".dimmed());
        }
    }

    /// The bearer token, or an auth error when absent.
    fn require_token(&self) -> Result<String> {
        self.store
            .current_token()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CisError::Auth("not logged in".to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// login / logout
// ---------------------------------------------------------------------------

/// Log in, persist the session, and hydrate the profile.
pub async fn login(ctx: &AppContext, username: Option<String>) -> Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    let username = match username {
        Some(u) => u,
        None => editor.readline("Username: ")?.trim().to_string(),
    };
    let password = editor.readline("Password: ")?;

    ctx.store.login(&ctx.api, &username, &password).await?;
    ctx.hydrator.hydrate(&ctx.store, &ctx.api).await?;

    let greeting = ctx
        .store
        .current_profile()
        .map(|p| p.display_name)
        .or_else(|| ctx.store.current_user().map(|u| u.display_name))
        .unwrap_or(username);
    println!("{} {}", "Logged in as".green(), greeting.bold());
    Ok(())
}

/// Log out and clear the persisted session. Idempotent.
pub fn logout(ctx: &AppContext) {
    ctx.store.logout();
    println!("{}", "Logged out".green());
}

// ---------------------------------------------------------------------------
// profile
// ---------------------------------------------------------------------------

/// Show the hydrated profile.
pub async fn profile(ctx: &AppContext) -> Result<()> {
    let chrome = ctx.enter(view::PROFILE_PATH)?;
    ctx.hydrator.hydrate(&ctx.store, &ctx.api).await?;

    let profile = ctx
        .store
        .current_profile()
        .ok_or_else(|| CisError::Api("profile data not received".to_string()))?;

    let mut table = Table::new();
    table.add_row(row!["Name", profile.display_name]);
    table.add_row(row!["Role", profile.role.to_string()]);
    table.add_row(row!["Email", profile.email]);
    table.add_row(row!["Phone", profile.mobile]);
    table.add_row(row!["Title", profile.title]);
    table.add_row(row!["Department", profile.department]);
    table.add_row(row!["Principal name", profile.principal_name]);
    table.add_row(row!["Created", profile.when_created]);
    table.add_row(row!["Changed", profile.when_changed]);
    if !profile.member_of.is_empty() {
        table.add_row(row!["Groups", profile.member_of.join(", ")]);
    }
    table.printstd();

    ctx.leave(chrome);
    Ok(())
}

// ---------------------------------------------------------------------------
// classes / students
// ---------------------------------------------------------------------------

/// List the available classes, academic classes first.
pub async fn classes(ctx: &AppContext) -> Result<()> {
    let chrome = ctx.enter(view::CLASSES_PATH)?;
    let token = ctx.require_token()?;

    let cancel = CancellationToken::new();
    let mut classes = ctx.api.fetch_classes(&token, &cancel).await?;
    sort_classes(&mut classes);

    if classes.is_empty() {
        println!("No classes available");
    } else {
        let mut table = Table::new();
        table.add_row(row!["ID", "Class"]);
        for class in &classes {
            table.add_row(row![class.id, class.name]);
        }
        table.printstd();
    }

    ctx.leave(chrome);
    Ok(())
}

/// List the students of one class.
pub async fn students(ctx: &AppContext, class_id: &str) -> Result<()> {
    let chrome = ctx.enter(&view::class_roster_path(class_id))?;
    let token = ctx.require_token()?;

    let cancel = CancellationToken::new();
    let students = ctx.api.fetch_students(&token, class_id, &cancel).await?;

    if students.is_empty() {
        println!("No students in class {}", class_id);
    } else {
        let mut table = Table::new();
        table.add_row(row!["ID", "Student"]);
        for student in &students {
            table.add_row(row![student.id, student.name]);
        }
        table.printstd();
    }

    ctx.leave(chrome);
    Ok(())
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Interactive rubric evaluation of one student.
pub async fn evaluate(
    ctx: &AppContext,
    class_id: &str,
    student_id: &str,
    student_name: &str,
    student_name_ru: Option<&str>,
) -> Result<()> {
    let chrome = ctx.enter(&view::evaluation_path(class_id, student_id))?;
    let token = ctx.require_token()?;

    let mut form = EvaluationForm::new(
        student_id,
        student_name,
        student_name_ru.unwrap_or(student_name),
        class_id,
    );

    let criteria = ctx.api.fetch_criteria(&token).await?;
    form.begin_editing(criteria);

    println!(
        "Evaluating {} (class {}), {} criteria, scores 1-3",
        form.student_name().bold(),
        form.class_year(),
        form.criteria().len()
    );

    let mut editor = rustyline::DefaultEditor::new()?;
    for index in 0..form.criteria().len() {
        let name = form.criteria()[index].criterion_name.clone();
        println!();
        println!("{}", name.bold());

        let line = editor.readline("  Score [1-3] (default 1): ")?;
        if let Ok(score) = line.trim().parse::<u8>() {
            // update_score clamps into the valid range.
            form.update_score(index, score);
        }

        let comment = editor.readline("  Comment (optional): ")?;
        form.update_comment(index, comment);
    }
    println!();
    let overall = editor.readline("Overall comment (optional): ")?;
    form.set_overall_comment(overall);

    match form.submit(&ctx.api, &token).await {
        Ok(receipt) => {
            println!();
            println!("{}", receipt.message.green().bold());
            println!(
                "Evaluation #{}: total {} ({:.1}%)",
                receipt.evaluation_id, receipt.total_score, receipt.percentage
            );
            debug_assert!(matches!(form.state(), FormState::Submitted { .. }));

            // Hold the confirmation on screen, then discard the draft and
            // navigate back to the class roster.
            tokio::time::sleep(SUCCESS_DISPLAY_WINDOW).await;
            drop(form);
            students(ctx, class_id).await?;
        }
        Err(e) => {
            // Input is preserved in the form; surface the message and let
            // the user re-run with the same draft semantics.
            let text = form.error().unwrap_or("server error").to_string();
            println!("{} {}", "Submission failed:".red(), text);
            return Err(e);
        }
    }

    ctx.leave(chrome);
    Ok(())
}

// ---------------------------------------------------------------------------
// evaluations / stats
// ---------------------------------------------------------------------------

/// List the current user's submitted evaluations.
pub async fn evaluations(ctx: &AppContext) -> Result<()> {
    let chrome = ctx.enter(view::MY_EVALUATIONS_PATH)?;
    let token = ctx.require_token()?;

    let cancel = CancellationToken::new();
    let response = ctx.api.fetch_my_evaluations(&token, &cancel).await?;

    println!("{} evaluation(s)", response.count);
    if !response.evaluations.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["ID", "Student", "Class", "Score", "%", "Date"]);
        for eval in &response.evaluations {
            table.add_row(row![
                eval.id,
                eval.student_name_kz,
                eval.class_year,
                format!("{}/{}", eval.total_score, eval.max_possible_score),
                format!("{:.1}", eval.percentage),
                eval.created_at
            ]);
        }
        table.printstd();
    }

    ctx.leave(chrome);
    Ok(())
}

/// Show the statistics dashboard data.
pub async fn stats(ctx: &AppContext, per_class: bool) -> Result<()> {
    let chrome = ctx.enter(view::DASHBOARD_PATH)?;
    let token = ctx.require_token()?;

    let body = if per_class {
        ctx.api.fetch_statistics_classes(&token).await?
    } else {
        ctx.api.fetch_statistics_summary(&token).await?
    };
    println!("{}", serde_json::to_string_pretty(&body)?);

    ctx.leave(chrome);
    Ok(())
}
