use axum::{http::StatusCode, response::Response, routing::get, Router};
use time::OffsetDateTime;
use tracing::instrument;

use super::calendar::{month_grid, month_label, WEEKDAYS};
use crate::{
    auth::extractors::AuthUser,
    flash::IncomingFlash,
    state::AppState,
    views::{render, CalendarPage, HomePage},
};

pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/calendar", get(calendar))
}

#[instrument(skip_all)]
pub async fn home(
    AuthUser(user): AuthUser,
    flash: IncomingFlash,
) -> Result<Response, (StatusCode, String)> {
    let page = HomePage {
        title: "Home.",
        template: "home-page",
        body: format!("Welcome, {}.", user.fullname),
        messages: flash.messages(),
        fullname: user.fullname,
        username: user.username,
    };
    render(&page, &flash)
}

#[instrument(skip_all)]
pub async fn calendar(
    _: AuthUser,
    flash: IncomingFlash,
) -> Result<Response, (StatusCode, String)> {
    let today = OffsetDateTime::now_utc().date();
    let weeks: Vec<Vec<String>> = month_grid(today)
        .iter()
        .map(|week| {
            week.iter()
                .map(|day| day.map(|d| d.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let page = CalendarPage {
        title: "Calendar.",
        template: "calendar-page",
        body: month_label(today),
        messages: flash.messages(),
        weekdays: WEEKDAYS,
        weeks,
        today: today.day().to_string(),
    };
    render(&page, &flash)
}

#[cfg(test)]
mod tests {
    use crate::{app::build_app, state::AppState};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn home_requires_login() {
        let (state, _) = AppState::fake();
        let server = TestServer::new(build_app(state)).unwrap();
        let res = server.get("/").await;
        res.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/auth/login?next=%2F");
    }

    #[tokio::test]
    async fn calendar_renders_current_month_for_session() {
        let (state, _) = AppState::fake();
        let server = TestServer::new(build_app(state)).unwrap();
        let signup = server
            .post("/auth/signup")
            .form(&[
                ("fullname", "Grace Hopper"),
                ("username", "grace"),
                ("email", "grace@example.com"),
                ("phone", "555-0100-22"),
                ("password", "cobol-forever"),
            ])
            .await;
        signup.assert_status(StatusCode::SEE_OTHER);

        let res = server.get("/calendar").add_cookie(signup.cookie("session")).await;
        res.assert_status_ok();
        let html = res.text();
        let label = super::month_label(time::OffsetDateTime::now_utc().date());
        assert!(html.contains(&label));
        assert!(html.contains("class=\"today\""));
    }
}
