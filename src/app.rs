//! Application state management for the destination explorer
//!
//! This module contains the explorer view state, handling keyboard input,
//! country loading, and state transitions between the list and detail views.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::data::{Country, Photo, Region};
use crate::explorer::{country_details, CountryDetails, Explorer, ExplorerFilter};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching the country list
    Loading,
    /// List view showing the filtered countries
    CountryList,
    /// Detail view for the country held in `App::detail`
    CountryDetail,
}

/// Work requested by a key press that needs the network
///
/// Key handling is synchronous; the event loop runs the pending task
/// between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingTask {
    ApplyFilter(ExplorerFilter),
    Refresh,
    LoadPhotos,
}

/// The country shown in the detail view
#[derive(Debug, Clone)]
pub struct DetailView {
    pub country: Country,
    pub details: CountryDetails,
    /// `None` while the photo search is outstanding
    pub photos: Option<Vec<Photo>>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of currently selected country in list view
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether keys are being typed into the search box
    pub search_active: bool,
    /// Country list and filter
    pub explorer: Explorer,
    pub detail: Option<DetailView>,
    /// Last load failure, shown in the footer
    pub status_message: Option<String>,
    /// Timestamp of last successful country load
    pub last_refresh: Option<DateTime<Local>>,
    /// Scroll offset for the detail view
    pub detail_scroll_offset: u16,
    pending: Option<PendingTask>,
}

impl App {
    /// Creates the explorer view; the first load is queued for the event loop
    ///
    /// # Arguments
    /// * `explorer` - Explorer backed by the shared provider client
    /// * `region` - Region to open with, or `None` for every country
    pub fn new(explorer: Explorer, region: Option<Region>) -> Self {
        Self {
            state: AppState::Loading,
            selected_index: 0,
            should_quit: false,
            show_help: false,
            search_active: false,
            explorer,
            detail: None,
            status_message: None,
            last_refresh: None,
            detail_scroll_offset: 0,
            pending: Some(PendingTask::ApplyFilter(ExplorerFilter::new(region, ""))),
        }
    }

    pub fn pending(&self) -> Option<&PendingTask> {
        self.pending.as_ref()
    }

    pub fn country_count(&self) -> usize {
        self.explorer.countries().len()
    }

    /// Returns the currently selected country, if any
    pub fn selected_country(&self) -> Option<&Country> {
        self.explorer.countries().get(self.selected_index)
    }

    /// Runs the task queued by the last key press, if any
    pub async fn run_pending(&mut self) {
        let Some(task) = self.pending.take() else {
            return;
        };

        match task {
            PendingTask::ApplyFilter(filter) => {
                let result = self.explorer.apply_filter(filter).await.map(|_| ());
                self.finish_load(result);
            }
            PendingTask::Refresh => {
                let result = self.explorer.refresh().await.map(|_| ());
                self.finish_load(result);
            }
            PendingTask::LoadPhotos => {
                if let Some(country) = self.detail.as_ref().map(|d| d.country.clone()) {
                    let photos = self.explorer.photos(&country).await;
                    if let Some(detail) = self.detail.as_mut() {
                        detail.photos = Some(photos);
                    }
                }
            }
        }
    }

    fn finish_load<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        match result {
            Ok(()) => {
                self.status_message = None;
                self.last_refresh = Some(Local::now());
            }
            Err(e) => {
                self.status_message = Some(format!("Failed to load countries: {}", e));
            }
        }
        self.clamp_selection();
        if self.state == AppState::Loading {
            self.state = AppState::CountryList;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Arguments
    /// * `key_event` - The keyboard event to handle
    ///
    /// # Key Bindings
    /// - `q` or `Esc` (in CountryList): Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection in list / scroll in detail
    /// - `Enter`: Open the selected country
    /// - `/`: Type a search; `Enter` keeps it, `Esc` clears it
    /// - `Tab`: Cycle the region filter
    /// - `r`: Refresh from the providers
    /// - `Esc` (in CountryDetail): Go back to list view
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if self.search_active {
            self.handle_search_key(key_event);
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::CountryList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    self.open_selected();
                }
                KeyCode::Char('/') => {
                    self.search_active = true;
                }
                KeyCode::Tab => {
                    let filter = self.explorer.filter();
                    let next = ExplorerFilter::new(Region::cycle(filter.region), filter.search.clone());
                    self.pending = Some(PendingTask::ApplyFilter(next));
                }
                KeyCode::Char('r') => {
                    self.pending = Some(PendingTask::Refresh);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::CountryDetail => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.detail = None;
                    self.detail_scroll_offset = 0;
                    self.state = AppState::CountryList;
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.detail_scroll_offset = self.detail_scroll_offset.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        let mut search = self.explorer.filter().search.clone();
        match key_event.code {
            KeyCode::Enter => {
                self.search_active = false;
                return;
            }
            KeyCode::Esc => {
                self.search_active = false;
                search.clear();
            }
            KeyCode::Backspace => {
                search.pop();
            }
            KeyCode::Char(c) => {
                search.push(c);
            }
            _ => return,
        }
        self.explorer.set_search(search);
        self.selected_index = 0;
    }

    fn open_selected(&mut self) {
        let Some(country) = self.selected_country().cloned() else {
            return;
        };
        self.detail = Some(DetailView {
            details: country_details(&country),
            country,
            photos: None,
        });
        self.detail_scroll_offset = 0;
        self.state = AppState::CountryDetail;
        self.pending = Some(PendingTask::LoadPhotos);
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.country_count();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.country_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    fn clamp_selection(&mut self) {
        let count = self.country_count();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }
}
