// Module bindings: one navigation context per bound portal application.

pub mod course_grades;
pub mod course_schedule;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::MAX_POPUP_CLOSE_ATTEMPTS;
use crate::error::{BindError, NavigationError, QueryError};
use crate::model::SemesterType;
use crate::navigation::{Event, ModuleContext};
use crate::parser::{parse_records, ComboBox, Document, FromRow, ParseError, Table};
use crate::session::Session;

pub use course_grades::{CourseGradesApplication, CourseGradesApplicationBuilder};
pub use course_schedule::{CourseScheduleApplication, CourseScheduleApplicationBuilder};

/// Portal applications this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    CourseGrades,
    CourseSchedule,
}

impl ModuleKind {
    /// Web Dynpro application name.
    pub fn app_name(self) -> &'static str {
        match self {
            Self::CourseGrades => "ZCMB3W0017",
            Self::CourseSchedule => "ZCMW2100",
        }
    }

    pub fn requires_authentication(self) -> bool {
        match self {
            Self::CourseGrades => true,
            Self::CourseSchedule => false,
        }
    }
}

/// Queries shared by every module: one validated query in, typed records out.
#[async_trait]
pub trait PortalModule: Send + Sync {
    type Query: Send + Sync;
    type Record: Send;

    async fn query(&self, query: &Self::Query) -> Result<Vec<Self::Record>, QueryError>;
}

/// A module bound to a session. Queries on one `Application` run one at a
/// time; separate `Application`s never share navigation state.
pub struct Application {
    session: Session,
    module: ModuleKind,
    context: Mutex<ModuleContext>,
}

async fn open_context(session: &Session, module: ModuleKind) -> Result<ModuleContext, BindError> {
    let name = module.app_name();
    if module.requires_authentication() && !session.is_authenticated() {
        return Err(BindError::ModuleUnavailable {
            module: name,
            reason: "requires an authenticated session".to_string(),
        });
    }

    let loaded = ModuleContext::load(session.transport(), session.config(), name).await;
    let mut context = match loaded {
        Ok(context) => context,
        Err(NavigationError::NotFound { .. }) => {
            return Err(BindError::ModuleUnavailable {
                module: name,
                reason: "application not found on the portal".to_string(),
            })
        }
        Err(NavigationError::Rejected { .. } | NavigationError::SessionExpired)
            if !session.is_authenticated() =>
        {
            return Err(BindError::ModuleUnavailable {
                module: name,
                reason: "not accessible without logging in".to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    context.initialize(session.transport()).await?;
    Ok(context)
}

impl Application {
    /// Navigates to `module` and performs the initial load. Every call is a
    /// fresh binding with its own server-side context.
    pub async fn bind(session: &Session, module: ModuleKind) -> Result<Self, BindError> {
        let context = open_context(session, module).await?;
        info!(
            "module bound app={} session_freshness={} secure_id={}",
            module.app_name(),
            session.freshness(),
            context.form().secure_id
        );
        Ok(Self {
            session: session.clone(),
            module,
            context: Mutex::new(context),
        })
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Event round trips made on the current context.
    pub async fn round_trips(&self) -> u64 {
        self.context.lock().await.round_trips()
    }

    pub async fn secure_id(&self) -> String {
        self.context.lock().await.form().secure_id.clone()
    }

    /// Exclusive access to the module screen for one query.
    ///
    /// A context left stale by an unfinished query is replaced by a fresh
    /// binding first. The returned screen stays stale until
    /// [`Screen::finish`] is called.
    pub(crate) async fn screen(&self) -> Result<Screen<'_>, QueryError> {
        let mut guard = self.context.lock().await;
        if guard.is_stale() {
            warn!(
                "re-navigating module after an unfinished query app={}",
                self.module.app_name()
            );
            *guard = open_context(&self.session, self.module).await?;
        }
        guard.mark_stale();
        Ok(Screen {
            session: &self.session,
            context: guard,
        })
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        debug!("module binding released app={}", self.module.app_name());
    }
}

/// Locked module screen for the duration of one query.
pub(crate) struct Screen<'a> {
    session: &'a Session,
    context: MutexGuard<'a, ModuleContext>,
}

impl Screen<'_> {
    pub(crate) fn html(&self) -> &str {
        self.context.page().html()
    }

    pub(crate) async fn submit(&mut self, events: &[Event]) -> Result<(), QueryError> {
        self.context
            .submit(self.session.transport(), events)
            .await
            .map_err(QueryError::from)
    }

    pub(crate) fn combo_box(&self, id: &str) -> Result<ComboBox, QueryError> {
        Ok(Document::parse(self.html()).combo_box(id)?)
    }

    /// Selects `key` unless the combo box already shows it.
    pub(crate) async fn select_key(&mut self, id: &str, key: &str) -> Result<(), QueryError> {
        let combo = self.combo_box(id)?;
        if combo.selected_key() == Some(key) {
            return Ok(());
        }
        if !combo.has_key(key) {
            return Err(QueryError::SelectionNotOffered {
                control: id.to_string(),
                value: key.to_string(),
            });
        }
        self.submit(&[Event::combo_box_select(id, key)]).await
    }

    /// Selects the item displayed as `text`.
    pub(crate) async fn select_text(&mut self, id: &str, text: &str) -> Result<(), QueryError> {
        let combo = self.combo_box(id)?;
        let key = combo
            .key_for_text(text)
            .ok_or_else(|| QueryError::SelectionNotOffered {
                control: id.to_string(),
                value: text.to_string(),
            })?
            .to_string();
        self.submit(&[Event::combo_box_select(id, &key)]).await
    }

    pub(crate) fn table(&self, id: &str) -> Result<Table, QueryError> {
        Ok(Document::parse(self.html()).table(id)?)
    }

    /// Every row of table `id` as records, scrolling through the windows the
    /// portal renders until the reported row count is reached.
    pub(crate) async fn read_table<T: FromRow>(
        &mut self,
        id: &str,
        ctx: &T::Context,
    ) -> Result<Vec<T>, QueryError> {
        let mut table = self.table(id)?;
        let total = table
            .row_count
            .ok_or_else(|| ParseError::table(id, "table reports no row count"))?;
        let mut records: Vec<T> = Vec::with_capacity(total);
        while records.len() < total {
            let mut window = parse_records::<T>(&table, ctx)?;
            // the last window is aligned to the end and repeats earlier rows
            let overlap = (records.len() + window.len()).saturating_sub(total);
            window.drain(..overlap.min(window.len()));
            if window.is_empty() {
                if records.is_empty() {
                    // a lone no-data row counts towards the total
                    break;
                }
                return Err(QueryError::PortalProtocolChanged(format!(
                    "scrolling {id} stopped at {} of {total} rows",
                    records.len()
                )));
            }
            records.append(&mut window);
            if records.len() < total {
                debug!("scrolling table id={} first_visible={}", id, records.len());
                self.submit(&[Event::sap_table_vertical_scroll(id, records.len())])
                    .await?;
                let previous = std::mem::replace(&mut table, self.table(id)?);
                if table.rows == previous.rows {
                    return Err(QueryError::PortalProtocolChanged(format!(
                        "{id} did not scroll past row {} of {total}",
                        records.len()
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Year and term the period combo boxes currently show.
    pub(crate) fn selected_term(
        &self,
        year_id: &str,
        semester_id: &str,
    ) -> Result<(u32, SemesterType), QueryError> {
        let shown = |id: &str| -> Result<String, QueryError> {
            let combo = self.combo_box(id)?;
            combo
                .selected_key()
                .map(str::to_string)
                .ok_or_else(|| {
                    ParseError::table(id, format!("no item matches {:?}", combo.value)).into()
                })
        };
        let year = shown(year_id)?;
        let year = year.parse().map_err(|_| {
            QueryError::from(ParseError::table(year_id, format!("bad year {year:?}")))
        })?;
        let semester = shown(semester_id)?;
        let semester = SemesterType::from_key(&semester).ok_or_else(|| {
            QueryError::from(ParseError::table(semester_id, format!("bad term key {semester:?}")))
        })?;
        Ok((year, semester))
    }

    /// Closes notice popups until none remain.
    pub(crate) async fn close_popups(&mut self) -> Result<(), QueryError> {
        for _ in 0..MAX_POPUP_CLOSE_ATTEMPTS {
            let popups = Document::parse(self.html()).popup_ids()?;
            let Some(id) = popups.into_iter().next() else {
                return Ok(());
            };
            debug!("closing popup id={}", id);
            self.submit(&[Event::popup_close(&id)]).await?;
        }
        Err(QueryError::PortalProtocolChanged(format!(
            "popups still open after {MAX_POPUP_CLOSE_ATTEMPTS} close attempts"
        )))
    }

    /// Marks the context consistent again.
    pub(crate) fn finish(mut self) {
        self.context.mark_clean();
    }

    /// Finishes the screen when `outcome` left the page consistent, which is
    /// on success and on parse failures. Interrupted round trips keep it stale.
    pub(crate) fn settle<T>(self, outcome: Result<T, QueryError>) -> Result<T, QueryError> {
        if matches!(outcome, Ok(_) | Err(QueryError::ParseFailure { .. })) {
            self.finish();
        }
        outcome
    }
}
