#![windows_subsystem = "windows"]
slint::include_modules!();

use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use profile_finder::avatar::{download_avatar_pixels, AvatarPixels};
use profile_finder::client::GitHubClient;
use profile_finder::config::Config;
use profile_finder::controller::{lookup, AvatarRequest, SearchController};
use profile_finder::state::{Action, Effect, SearchState, Ticket};
use slint::{ComponentHandle, SharedString, VecModel};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load()?;
    let client = GitHubClient::new(&config.api_base_url)?;

    // Background tokio runtime for async HTTP
    let rt = tokio::runtime::Runtime::new()?;

    // Create the UI
    let app = AppWindow::new()?;

    let ui = Ui {
        window: app.as_weak(),
        controller: Arc::new(Mutex::new(SearchController::new(client))),
        runtime: rt.handle().clone(),
        scroll_delay: config.scroll_delay,
        avatar_size: config.avatar_size,
        avatar_timeout: config.avatar_timeout,
    };

    {
        let ui = ui.clone();
        app.on_query_edited(move |text| ui.apply(Action::QueryChanged(text.to_string())));
    }
    {
        let ui = ui.clone();
        app.on_search_requested(move || ui.apply(Action::Submit));
    }
    {
        let ui = ui.clone();
        app.on_history_selected(move |username| ui.apply(Action::SelectHistory(username.to_string())));
    }
    {
        let ui = ui.clone();
        app.on_theme_toggled(move || ui.apply(Action::ToggleTheme));
    }

    app.on_profile_clicked(|url| open_in_browser(&url));
    app.on_blog_clicked(|url| open_in_browser(&url));

    render(&app, ui.controller().state());

    info!("Profile finder ready, using {}", config.api_base_url);
    app.run()?;

    Ok(())
}

/// Glue between the window and the search controller. Cheap to clone into
/// callbacks; every method except the spawned lookup runs on the UI thread.
#[derive(Clone)]
struct Ui {
    window: slint::Weak<AppWindow>,
    controller: Arc<Mutex<SearchController<GitHubClient>>>,
    runtime: Handle,
    scroll_delay: Duration,
    avatar_size: u32,
    avatar_timeout: Duration,
}

impl Ui {
    fn controller(&self) -> MutexGuard<'_, SearchController<GitHubClient>> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, action: Action) {
        let Some(app) = self.window.upgrade() else { return };

        let effects = {
            let mut controller = self.controller();
            let effects = controller.dispatch(action);
            render(&app, controller.state());
            effects
        };

        for effect in effects {
            match effect {
                Effect::Fetch(ticket) => self.spawn_lookup(ticket),
                Effect::ScrollToResult => self.schedule_scroll(),
            }
        }
    }

    /// Runs the lookup on the background runtime. The profile goes to the
    /// window first; the avatar follows in a second hop once downloaded.
    fn spawn_lookup(&self, ticket: Ticket) {
        let ui = self.clone();
        let source = self.controller().source();

        self.runtime.spawn(async move {
            let deliver = {
                let ui = ui.clone();
                move |action: Action| ui.post(move |ui| ui.apply(action))
            };
            let Some(AvatarRequest { seq, url }) = lookup(source.as_ref(), ticket, deliver).await else {
                return;
            };

            let pixels = download_avatar_pixels(source.http(), &url, ui.avatar_size, ui.avatar_timeout).await;
            if let Some(pixels) = pixels {
                ui.post(move |ui| ui.show_avatar(seq, pixels));
            }
        });
    }

    /// Queues `f` on the UI thread.
    fn post(&self, f: impl FnOnce(&Ui) + Send + 'static) {
        let ui = self.clone();
        if let Err(e) = slint::invoke_from_event_loop(move || f(&ui)) {
            warn!("Dropping lookup result, UI event loop is gone: {e}");
        }
    }

    fn show_avatar(&self, seq: u64, pixels: AvatarPixels) {
        let showing = {
            let controller = self.controller();
            controller.state().is_latest(seq) && controller.state().request().profile().is_some()
        };
        if !showing {
            return;
        }
        if let Some(app) = self.window.upgrade() {
            app.set_avatar(avatar_image(pixels));
        }
    }

    fn schedule_scroll(&self) {
        let window = self.window.clone();
        slint::Timer::single_shot(self.scroll_delay, move || {
            if let Some(app) = window.upgrade() {
                app.invoke_scroll_to_result();
            }
        });
    }
}

/// Copies the search state into the window properties.
fn render(app: &AppWindow, state: &SearchState) {
    let request = state.request();

    app.set_search_query(state.query().into());
    app.set_dark_mode(state.dark_mode());
    app.set_is_loading(request.is_loading());
    app.set_error_message(request.error().unwrap_or_default().into());

    match request.profile() {
        Some(profile) => {
            app.set_has_profile(true);
            app.set_login_name(profile.login.as_str().into());
            app.set_display_name(profile.display_name().into());
            app.set_bio(profile.bio.as_deref().unwrap_or_default().into());
            app.set_user_location(profile.location.as_deref().unwrap_or_default().into());
            app.set_blog(profile.blog_url().unwrap_or_default().into());
            app.set_repos(profile.public_repos.to_string().into());
            app.set_followers(profile.followers.to_string().into());
            app.set_following(profile.following.to_string().into());
            app.set_joined(profile.joined().into());
            app.set_profile_url(profile.html_url.as_str().into());
        }
        None => {
            app.set_has_profile(false);
            app.set_avatar(slint::Image::default());
        }
    }

    let history: Vec<SharedString> = state
        .history()
        .entries()
        .iter()
        .map(|entry| entry.as_str().into())
        .collect();
    app.set_history(Rc::new(VecModel::from(history)).into());
}

fn avatar_image(pixels: AvatarPixels) -> slint::Image {
    let buf = slint::SharedPixelBuffer::<slint::Rgba8Pixel>::clone_from_slice(
        &pixels.rgba,
        pixels.width,
        pixels.height,
    );
    slint::Image::from_rgba8(buf)
}

fn open_in_browser(url: &str) {
    if url.is_empty() {
        return;
    }
    if let Err(e) = open::that(url) {
        warn!("Failed to open {url}: {e}");
    }
}
