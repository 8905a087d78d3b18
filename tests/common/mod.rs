// Fake u-saint portal: SSO endpoints plus the two Web Dynpro screens, state keyed by secure id.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use saint_engine::navigation::event::{parse_queue, QueuedEvent};
use saint_engine::{PortalConfig, Session};

pub const STUDENT_ID: &str = "20231234";
pub const PASSWORD: &str = "correct-horse";
pub const LOGIN_ALERT: &str = "아이디 또는 비밀번호를 확인하세요.";
const SSO_TOKEN: &str = "tok-8f2c";

pub const SCHEDULE_APP: &str = "ZCMW2100";
pub const GRADES_APP: &str = "ZCMB3W0017";

pub const S_YEAR: &str = "ZCMW_PERIOD_RE.ID_A61C4ED604A2BFC2A8F6C6038DE6AF18:VIW_MAIN.PERYR";
pub const S_SEMESTER: &str = "ZCMW_PERIOD_RE.ID_A61C4ED604A2BFC2A8F6C6038DE6AF18:VIW_MAIN.PERID";
pub const ROWS: &str = "ZCMW2100.ID_0001:VIW_MODULES.ROWS";
pub const LV3: &str = "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV3";
pub const LV4: &str = "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV4";
pub const LV5: &str = "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV5";
pub const GENERAL_REQ: &str = "ZCMW2100.ID_0001:VIW_TAB_GENERAL_REQ.SM_OBJID";
pub const PROFESSOR: &str = "ZCMW2100.ID_0001:VIW_TAB_PROFESSOR.PROFESSOR";
pub const SEARCH_TEXT: &str = "ZCMW2100.ID_0001:VIW_TAB_SEARCH.SEARCH_TEXT";
pub const MAIN_TABLE: &str =
    "SALV_WD_TABLE.ID_DE0D9128A4327646C94670E2A892C99C:VIEW_TABLE.SALV_WD_UIE_TABLE";

pub const G_YEAR: &str = "ZCMW_PERIOD_RE.ID_0DC742680F42DA9747594D1AE51A0C69:VIW_MAIN.PERYR";
pub const G_SEMESTER: &str = "ZCMW_PERIOD_RE.ID_0DC742680F42DA9747594D1AE51A0C69:VIW_MAIN.PERID";
pub const COURSE_TYPE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.PROGC_VAR";
pub const SEMESTER_TABLE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.TABLE";
pub const CLASS_TABLE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.TABLE_1";
pub const DETAIL_POPUP: &str = "ZCMB3W0017.ID_0001:VIW_DETAIL.POPUP";
const DETAIL_TABLE: &str = "ZCMB3W0017.ID_0001:VIW_DETAIL.TABLE";
const DETAIL_BUTTON: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.BTN_DETAIL.";

pub const OPT_FIELD: &str = "ZCMW2100.ID_0001:VIW_TAB_GENERAL_OPT.DISCIPLINES";
pub const CHAPEL: &str = "ZCMW2100.ID_0001:VIW_TAB_CHAPEL_REQ.SM_OBJID";
pub const GRAD_LV3: &str = "ZCMW2100.ID_0001:VIW_TAB_GRADUATE.DDK_LV3";
pub const GRAD_LV4: &str = "ZCMW2100.ID_0001:VIW_TAB_GRADUATE.DDK_LV4";
pub const CONNECTED: &str = "ZCMW2100.ID_0001:VIW_TAB_YOMA.CONNECT_MAJO";
pub const UNITED: &str = "ZCMW2100.ID_0001:VIW_TAB_UNMA.CG_OBJID";

const PERSISTENT: &[&str] = &[S_YEAR, S_SEMESTER, ROWS, G_YEAR, G_SEMESTER, COURSE_TYPE];

const YEARS: &[(&str, &str)] = &[("2023", "2023"), ("2024", "2024"), ("2025", "2025")];
const SEMESTERS: &[(&str, &str)] = &[
    ("090", "1 학기"),
    ("091", "여름학기"),
    ("092", "2 학기"),
    ("093", "겨울학기"),
];
const ROW_COUNTS: &[(&str, &str)] = &[("10", "10"), ("500", "500")];
const COURSE_TYPES: &[(&str, &str)] = &[("UG", "학부"), ("MA", "석사")];
const COLLEGES: &[(&str, &str)] = &[("IT", "IT대학"), ("ENG", "공과대학")];
const REQUIRED_ELECTIVES: &[(&str, &str)] = &[("001", "대학글쓰기"), ("002", "컴퓨팅적사고")];
const OPTIONAL_FIELDS: &[(&str, &str)] = &[("A1", "인간·언어"), ("A2", "문화·예술")];
const CHAPELS: &[(&str, &str)] = &[("C1", "비전채플"), ("C2", "CHAPEL")];
const GRADUATE_SCHOOLS: &[(&str, &str)] = &[("GS", "일반대학원"), ("IS", "정보과학대학원")];
const CONNECTED_MAJORS: &[(&str, &str)] = &[("Y1", "융합소프트웨어"), ("Y2", "금융경제")];
const UNITED_MAJORS: &[(&str, &str)] = &[("U1", "빅데이터"), ("U2", "스마트모빌리티")];

fn graduate_departments(school: &str) -> &'static [(&'static str, &'static str)] {
    match school {
        "GS" => &[("GCS", "컴퓨터학과"), ("GEE", "전자공학과")],
        "IS" => &[("ISW", "소프트웨어학과")],
        _ => &[],
    }
}

fn departments(college: &str) -> &'static [(&'static str, &'static str)] {
    match college {
        "IT" => &[("CSE", "컴퓨터학부"), ("SW", "소프트웨어학부")],
        "ENG" => &[("ME", "기계공학부")],
        _ => &[],
    }
}

fn majors(department: &str) -> &'static [(&'static str, &'static str)] {
    match department {
        "SW" => &[("SWM", "소프트웨어전공")],
        _ => &[],
    }
}

const LECTURE_HEADERS: &[&str] = &[
    "계획",
    "이수구분(주전공)",
    "이수구분(다전공)",
    "공학인증",
    "교과영역",
    "과목번호",
    "과목명",
    "분반",
    "교수명",
    "개설학과",
    "시간/학점(설계)",
    "수강인원",
    "여석",
    "강의시간(강의실)",
    "수강대상",
];

fn lecture(code: &str, name: &str, professor: &str, department: &str, seats: &str) -> Vec<String> {
    [
        "", "전필-컴퓨터", "", "", "", code, name, "", professor, department, "3.0 /3", "40", seats,
        "월 10:30-11:45 (정보과학관 21203)", "전체",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn cyber_catalog(count: usize) -> Vec<Vec<String>> {
    if count == 0 {
        return vec![lecture("9000000001", "사이버윤리", "최교수", "숭실사이버대", "")];
    }
    (1..=count)
        .map(|i| {
            lecture(
                &format!("90000{i:05}"),
                &format!("사이버강좌{i}"),
                "최교수",
                "숭실사이버대",
                "",
            )
        })
        .collect()
}

fn catalog() -> Vec<Vec<String>> {
    vec![
        lecture("2150545501", "자료구조", "김교수", "컴퓨터학부", "3"),
        lecture("2150545502", "운영체제", "", "컴퓨터학부", ""),
        lecture("2150600101", "소프트웨어공학", "이교수", "소프트웨어학부", "12"),
        lecture("2150100101", "열역학", "박교수", "기계공학부", "10"),
        lecture("2150200101", "대학글쓰기", "정교수", "베어드교양대학", "25"),
    ]
}

const SEMESTER_HEADERS: &[&str] = &[
    "학년도", "학기", "신청학점", "취득학점", "P/F학점", "평점평균", "평점계", "산술평균",
    "학기별석차", "전체석차", "상담여부", "유급", "학사경고",
];
const CLASS_HEADERS: &[&str] = &[
    "이수학년도", "이수학기", "과목코드", "과목명", "과목학점", "성적", "등급", "교수명", "비고",
];
const DETAIL_HEADERS: &[&str] = &[
    "이수학년도", "이수학기", "과목코드", "과목명", "출석(20.000)", "중간고사(30.000)",
    "과제(20.000)", "기말고사(30.000)",
];

fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// One bound module as the portal tracks it.
#[derive(Debug, Clone)]
pub struct Screen {
    pub app: String,
    pub loaded: bool,
    pub tab: u32,
    pub selected: HashMap<String, String>,
    pub popups: u32,
    pub results: Option<Vec<Vec<String>>>,
    pub pressed: Vec<String>,
    pub events: Vec<String>,
    /// First rendered row per table id, moved by scroll events.
    pub first_visible: HashMap<String, usize>,
    /// Class code whose detail popup is open.
    pub detail: Option<String>,
}

impl Screen {
    fn new(app: &str, popups: u32) -> Self {
        let defaults: &[(&str, &str)] = if app == SCHEDULE_APP {
            &[(S_YEAR, "2025"), (S_SEMESTER, "090"), (ROWS, "10")]
        } else {
            &[(G_YEAR, "2025"), (G_SEMESTER, "090"), (COURSE_TYPE, "UG")]
        };
        Self {
            app: app.to_string(),
            loaded: false,
            tab: 0,
            selected: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            popups,
            results: None,
            pressed: Vec::new(),
            events: Vec::new(),
            first_visible: HashMap::new(),
            detail: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.selected.get(id).map(String::as_str)
    }
}

/// Knobs and observations shared with the tests.
#[derive(Debug, Default)]
pub struct PortalState {
    pub next_secure_id: u64,
    pub screens: HashMap<String, Screen>,
    pub navigations: HashMap<String, u32>,
    pub event_posts: u32,
    pub login_attempts: u32,
    pub portal_visits: u32,
    pub popups_on_bind: u32,
    pub sticky_popups: bool,
    pub expire_events: bool,
    pub expire_binds: bool,
    pub fail_events_with: Option<u16>,
    pub event_delay: Option<Duration>,
    pub missing_apps: HashSet<String>,
    pub served_app_name: Option<String>,
    pub reject_token_exchange: bool,
    pub broken_login_form: bool,
    pub corrupt_tables: bool,
    /// Rows rendered per table window; `None` renders whole tables.
    pub page_rows: Option<usize>,
    /// Scroll events are accepted but the window never moves.
    pub frozen_scroll: bool,
    /// Size of the cyber tab listing; 0 keeps the single default lecture.
    pub cyber_lectures: usize,
}

/// Behaviour switches read once per event post.
#[derive(Debug, Clone, Copy)]
struct Knobs {
    sticky_popups: bool,
    corrupt_tables: bool,
    page_rows: Option<usize>,
    frozen_scroll: bool,
    cyber_lectures: usize,
}

impl PortalState {
    fn knobs(&self) -> Knobs {
        Knobs {
            sticky_popups: self.sticky_popups,
            corrupt_tables: self.corrupt_tables,
            page_rows: self.page_rows,
            frozen_scroll: self.frozen_scroll,
            cyber_lectures: self.cyber_lectures,
        }
    }
}

type Shared = Arc<Mutex<PortalState>>;

pub struct TestPortal {
    pub base: String,
    pub state: Shared,
}

impl TestPortal {
    pub fn config(&self) -> PortalConfig {
        let mut config = PortalConfig::for_host(&self.base);
        config.request_timeout_secs = 5;
        config.connect_timeout_secs = 2;
        config
    }

    pub async fn anonymous(&self) -> Session {
        Session::anonymous(self.config()).await.unwrap()
    }

    pub async fn login(&self) -> Session {
        Session::with_credentials(self.config(), STUDENT_ID, PASSWORD)
            .await
            .unwrap()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PortalState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn navigations(&self, app: &str) -> u32 {
        self.with(|s| s.navigations.get(app).copied().unwrap_or(0))
    }

    pub fn screen(&self, secure_id: &str) -> Screen {
        self.with(|s| s.screens[secure_id].clone())
    }

    pub fn event_count(&self, secure_id: &str, kind: &str) -> usize {
        self.screen(secure_id)
            .events
            .iter()
            .filter(|e| *e == kind)
            .count()
    }
}

pub async fn start_portal() -> TestPortal {
    let state: Shared = Arc::new(Mutex::new(PortalState::default()));
    let app = Router::new()
        .route("/irj/portal", get(portal_home))
        .route("/Symtra_sso/smln.asp", get(login_page))
        .route("/Symtra_sso/smln_pcs.asp", post(login_submit))
        .route("/webSSO/sso.jsp", get(token_exchange))
        .route("/sap/bc/webdynpro/SAP/:app", get(open_app).post(handle_events))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestPortal {
        base: format!("http://{addr}"),
        state,
    }
}

fn logon_page() -> Response {
    Html(r#"<html><body><form name="sap-system-login" method="post"></form></body></html>"#)
        .into_response()
}

async fn portal_home(State(state): State<Shared>) -> Response {
    state.lock().portal_visits += 1;
    (
        [(header::SET_COOKIE, "saplb=J2EE1; Path=/")],
        Html("<html><body>portal</body></html>"),
    )
        .into_response()
}

async fn login_page(State(state): State<Shared>) -> Response {
    if state.lock().broken_login_form {
        return Html("<html><body>maintenance</body></html>").into_response();
    }
    Html(
        r#"<html><body><form name="LoginInfo" method="post" action="smln_pcs.asp">
        <input type="hidden" name="in_tp_bit" value="0">
        <input type="hidden" name="rqst_caus_cd" value="03">
        <input type="text" name="userid"><input type="password" name="pwd">
        </form></body></html>"#,
    )
    .into_response()
}

async fn login_submit(
    State(state): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.lock().login_attempts += 1;
    let field = |k: &str| form.get(k).map(String::as_str);
    let accepted = field("userid") == Some(STUDENT_ID)
        && field("pwd") == Some(PASSWORD)
        && field("in_tp_bit") == Some("0")
        && field("rqst_caus_cd") == Some("03");
    if accepted {
        (
            [(header::SET_COOKIE, format!("sToken={SSO_TOKEN}; Path=/"))],
            Html("<html><body>ok</body></html>".to_string()),
        )
            .into_response()
    } else {
        Html(format!(
            r#"<html><script>alert("{LOGIN_ALERT}"); history.back();</script></html>"#
        ))
        .into_response()
    }
}

async fn token_exchange(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let rejected = state.lock().reject_token_exchange;
    let valid = query.get("sToken").map(String::as_str) == Some(SSO_TOKEN)
        && query.get("sIdno").map(String::as_str) == Some(STUDENT_ID);
    if rejected || !valid {
        return Html("<html><body>invalid token</body></html>").into_response();
    }
    (
        [(header::SET_COOKIE, "MYSAPSSO2=AjQxMDIBABg; Path=/")],
        Html("<html><body>welcome</body></html>"),
    )
        .into_response()
}

async fn open_app(
    State(state): State<Shared>,
    Path(app): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut st = state.lock();
    *st.navigations.entry(app.clone()).or_default() += 1;
    let known = app == SCHEDULE_APP || app == GRADES_APP;
    if !known || st.missing_apps.contains(&app) {
        return (StatusCode::NOT_FOUND, "no such application").into_response();
    }
    let authenticated = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("MYSAPSSO2="));
    if st.expire_binds || (app == GRADES_APP && !authenticated) {
        return logon_page();
    }

    st.next_secure_id += 1;
    let sid = format!("SID{:04}", st.next_secure_id);
    let served = st.served_app_name.clone().unwrap_or_else(|| app.clone());
    let popups = st.popups_on_bind;
    st.screens.insert(sid.clone(), Screen::new(&app, popups));

    Html(format!(
        r#"<html><head><title>{app}</title></head><body>
<form id="sap.client.SsrClient.form" action="/sap/bc/webdynpro/SAP/{app}?sap-contextid={sid}" method="post">
<input type="hidden" name="sap-charset" value="utf-8">
<input type="hidden" name="sap-wd-secure-id" value="{sid}">
<input type="hidden" name="fesrAppName" value="{served}">
<input type="hidden" name="fesrUseBeacon" value="false">
</form>
<div id="sapwd_main_window_root_"><div id="_loadingPlaceholder_">loading</div></div>
</body></html>"#
    ))
    .into_response()
}

async fn handle_events(
    State(state): State<Shared>,
    Path(_app): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let delay = state.lock().event_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut st = state.lock();
    st.event_posts += 1;
    if let Some(code) = st.fail_events_with {
        return StatusCode::from_u16(code).unwrap().into_response();
    }
    if st.expire_events {
        return logon_page();
    }
    let knobs = st.knobs();
    let (Some(sid), Some(queue)) = (form.get("sap-wd-secure-id"), form.get("SAPEVENTQUEUE")) else {
        return (StatusCode::BAD_REQUEST, "missing form fields").into_response();
    };
    let Ok(events) = parse_queue(queue) else {
        return (StatusCode::BAD_REQUEST, "bad event queue").into_response();
    };
    let Some(screen) = st.screens.get_mut(sid) else {
        return logon_page();
    };

    let mut full = false;
    for event in &events {
        full |= event.kind == "LoadingPlaceHolder_Load";
        apply(screen, event, knobs);
    }
    let html = render(screen, knobs);
    let xml = if full {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><updates><full-update windowid="sapwd_main_window"><content-update id="sapwd_main_window_root_"><![CDATA[{html}]]></content-update></full-update></updates>"#
        )
    } else {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><updates><delta-update windowid="sapwd_main_window"><control-update id="WD_SCREEN"><content><![CDATA[{html}]]></content></control-update><script-call method="focus"/></delta-update></updates>"#
        )
    };
    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], xml).into_response()
}

fn apply(screen: &mut Screen, event: &QueuedEvent, knobs: Knobs) {
    screen.events.push(event.kind.clone());
    let id = event.parameter("Id").unwrap_or_default().to_string();
    match event.kind.as_str() {
        "LoadingPlaceHolder_Load" => screen.loaded = true,
        "ComboBox_Select" => {
            let key = event.parameter("Key").unwrap_or_default().to_string();
            if id.ends_with("DDK_LV3") {
                screen.selected.remove(&id.replace("LV3", "LV4"));
                screen.selected.remove(&id.replace("LV3", "LV5"));
            } else if id.ends_with("DDK_LV4") {
                screen.selected.remove(&id.replace("LV4", "LV5"));
            }
            screen.selected.insert(id, key);
            screen.results = None;
            screen.first_visible.clear();
        }
        "ComboBox_Change" => {
            let value = event.parameter("Value").unwrap_or_default().to_string();
            screen.selected.insert(id, value);
        }
        "TabStrip_TabSelect" => {
            screen.tab = event
                .parameter("ItemIndex")
                .and_then(|i| i.parse().ok())
                .unwrap_or(0);
            screen
                .selected
                .retain(|k, _| PERSISTENT.contains(&k.as_str()));
            screen.results = None;
            screen.first_visible.clear();
        }
        "SapTable_VerticalScroll" => {
            let first = event
                .parameter("FirstVisibleItemIndex")
                .and_then(|i| i.parse().ok())
                .unwrap_or(0);
            if !knobs.frozen_scroll {
                screen.first_visible.insert(id, first);
            }
        }
        "Button_Press" => {
            if let Some(code) = id.strip_prefix(DETAIL_BUTTON) {
                screen.detail = Some(code.to_string());
            } else {
                screen.results = Some(schedule_results(screen, knobs.cyber_lectures));
                screen.first_visible.clear();
            }
            screen.pressed.push(id);
        }
        "PopupWindow_Close" => {
            if id == DETAIL_POPUP {
                screen.detail = None;
            } else if !knobs.sticky_popups {
                screen.popups = screen.popups.saturating_sub(1);
            }
        }
        _ => {}
    }
}

fn matching(f: impl Fn(&[String]) -> bool) -> Vec<Vec<String>> {
    catalog().into_iter().filter(|r| f(r)).collect()
}

fn schedule_results(screen: &Screen, cyber_lectures: usize) -> Vec<Vec<String>> {
    let column = |label: &str| LECTURE_HEADERS.iter().position(|h| *h == label).unwrap();
    let (name, professor, department) = (column("과목명"), column("교수명"), column("개설학과"));
    let text = |id: &str| screen.get(id).unwrap_or_default().to_string();
    match screen.tab {
        0 => match (screen.get(LV4), screen.get(LV5)) {
            (Some("CSE"), _) => matching(|r| r[department] == "컴퓨터학부"),
            (Some("SW"), Some("SWM")) => matching(|r| r[department] == "소프트웨어학부"),
            (Some("ME"), _) => matching(|r| r[department] == "기계공학부"),
            _ => Vec::new(),
        },
        1 => {
            let wanted = REQUIRED_ELECTIVES
                .iter()
                .find(|(k, _)| Some(*k) == screen.get(GENERAL_REQ))
                .map(|(_, t)| t.to_string())
                .unwrap_or_default();
            matching(|r| r[name] == wanted)
        }
        10 => {
            let keyword = text(PROFESSOR);
            matching(|r| !r[professor].is_empty() && r[professor].contains(&keyword))
        }
        11 => {
            let keyword = text(SEARCH_TEXT);
            matching(|r| r[name].contains(&keyword))
        }
        14 => cyber_catalog(cyber_lectures),
        _ => Vec::new(),
    }
}

fn label<'a>(items: &'a [(&str, &'a str)], key: Option<&str>) -> &'a str {
    items
        .iter()
        .find(|(k, _)| Some(*k) == key)
        .map(|(_, t)| *t)
        .unwrap_or("")
}

fn combo(id: &str, value: &str, items: &[(&str, &str)]) -> String {
    let list = format!("{id}-LB");
    let entries: String = items
        .iter()
        .map(|(k, t)| format!(r#"<div ct="LIB_I" data-itemkey="{k}" data-itemvalue1="{t}">{t}</div>"#))
        .collect();
    format!(
        r#"<input ct="CB" id="{id}" value="{value}" lsdata="{{0:'100%',3:'{list}',7:false}}"><div ct="LIB" id="{list}">{entries}</div>"#
    )
}

/// Renders the window of `rows` starting at the screen's scroll position,
/// with the full row count in `lsdata`. The last window is aligned to the end.
fn table(
    screen: &Screen,
    id: &str,
    headers: &[&str],
    rows: Option<&[Vec<String>]>,
    page_rows: Option<usize>,
) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!(r#"<th subct="STHC"><span>{h}</span></th>"#))
        .collect();
    let total = rows.map_or(0, <[Vec<String>]>::len);
    let body: String = match rows {
        None => String::new(),
        Some([]) => format!(
            r#"<tr rt="1" rr="1"><td subct="STC" colspan="{}">데이터가 없습니다</td></tr>"#,
            headers.len()
        ),
        Some(rows) => {
            let page = page_rows.unwrap_or(total).max(1);
            let requested = screen.first_visible.get(id).copied().unwrap_or(0);
            let start = requested.min(total.saturating_sub(page));
            rows[start..(start + page).min(total)]
                .iter()
                .enumerate()
                .map(|(i, cells)| {
                    let tds: String = cells
                        .iter()
                        .map(|c| format!(r#"<td subct="STC"><span>{c}</span></td>"#))
                        .collect();
                    format!(r#"<tr rt="1" rr="{}">{tds}</tr>"#, start + i + 1)
                })
                .collect()
        }
    };
    format!(
        r#"<div ct="ST" id="{id}" lsdata="{{0:'',2:{total},3:{}}}"><table><tbody id="{id}-contentTBody"><tr rt="2">{head}</tr>{body}<tr rr="0"><td subct="STC"></td></tr></tbody></table></div>"#,
        headers.len()
    )
}

fn popups(count: u32) -> String {
    (0..count)
        .map(|i| format!(r#"<div ct="PW" id="WD_POPUP{i}"><span>안내</span></div>"#))
        .collect()
}

fn detail_popup(screen: &Screen) -> String {
    let Some(code) = screen.detail.as_deref() else {
        return String::new();
    };
    let rows = if code == "21500001" {
        owned(&[&["2023", "1 학기", "21500001", "자료구조", "20", "30", "", "28"]])
    } else {
        Vec::new()
    };
    format!(
        r#"<div ct="PW" id="{DETAIL_POPUP}"><span>상세성적</span>{}</div>"#,
        table(screen, DETAIL_TABLE, DETAIL_HEADERS, Some(&rows), None)
    )
}

fn render(screen: &Screen, knobs: Knobs) -> String {
    let body = if screen.app == SCHEDULE_APP {
        render_schedule(screen, knobs)
    } else {
        render_grades(screen, knobs)
    };
    format!(
        r#"<div id="WD_SCREEN">{body}{}{}</div>"#,
        popups(screen.popups),
        detail_popup(screen)
    )
}

fn render_schedule(screen: &Screen, knobs: Knobs) -> String {
    let mut html = String::new();
    html += &combo(S_YEAR, label(YEARS, screen.get(S_YEAR)), YEARS);
    html += &combo(S_SEMESTER, label(SEMESTERS, screen.get(S_SEMESTER)), SEMESTERS);
    html += &combo(ROWS, label(ROW_COUNTS, screen.get(ROWS)), ROW_COUNTS);
    html += &format!(
        r#"<div ct="TS" id="ZCMW2100.ID_0001:VIW_MAIN.MODULE_TABSTRIP" data-selected="{}"></div>"#,
        screen.tab
    );
    match screen.tab {
        0 => {
            html += &combo(LV3, label(COLLEGES, screen.get(LV3)), COLLEGES);
            if let Some(college) = screen.get(LV3) {
                let depts = departments(college);
                html += &combo(LV4, label(depts, screen.get(LV4)), depts);
            }
            if let Some(department) = screen.get(LV4) {
                let majors = majors(department);
                html += &combo(LV5, label(majors, screen.get(LV5)), majors);
            }
        }
        1 => html += &combo(GENERAL_REQ, label(REQUIRED_ELECTIVES, screen.get(GENERAL_REQ)), REQUIRED_ELECTIVES),
        2 => html += &combo(OPT_FIELD, label(OPTIONAL_FIELDS, screen.get(OPT_FIELD)), OPTIONAL_FIELDS),
        3 => html += &combo(CHAPEL, label(CHAPELS, screen.get(CHAPEL)), CHAPELS),
        7 => {
            html += &combo(GRAD_LV3, label(GRADUATE_SCHOOLS, screen.get(GRAD_LV3)), GRADUATE_SCHOOLS);
            if let Some(school) = screen.get(GRAD_LV3) {
                let depts = graduate_departments(school);
                html += &combo(GRAD_LV4, label(depts, screen.get(GRAD_LV4)), depts);
            }
        }
        8 => html += &combo(CONNECTED, label(CONNECTED_MAJORS, screen.get(CONNECTED)), CONNECTED_MAJORS),
        9 => html += &combo(UNITED, label(UNITED_MAJORS, screen.get(UNITED)), UNITED_MAJORS),
        10 => html += &combo(PROFESSOR, screen.get(PROFESSOR).unwrap_or_default(), &[]),
        11 => html += &combo(SEARCH_TEXT, screen.get(SEARCH_TEXT).unwrap_or_default(), &[]),
        _ => {}
    }
    let headers: Vec<&str> = LECTURE_HEADERS
        .iter()
        .map(|h| if knobs.corrupt_tables && *h == "과목명" { "과목" } else { *h })
        .collect();
    html += &table(screen, MAIN_TABLE, &headers, screen.results.as_deref(), knobs.page_rows);
    html
}

fn summary_inputs(course_type: &str) -> String {
    let values: &[(&str, &str)] = &[
        ("ATTM_CRD1", "130"),
        ("EARN_CRD1", "128.5"),
        ("GT_GPA1", "512.3"),
        ("CGPA1", "4.01"),
        ("AVG1", "93.2"),
        ("PF_EARN_CRD", "4"),
        ("ATTM_CRD2", "131"),
        ("EARN_CRD2", "129.5"),
        ("GT_GPA2", "515.0"),
        ("CGPA2", "4.02"),
        ("AVG2", "93.5"),
        ("T_PF_ERN_CRD1", "4.5"),
    ];
    values
        .iter()
        .map(|(id, v)| {
            let v = if course_type == "UG" { *v } else { "" };
            format!(r#"<input ct="I" id="ZCMB3W0017.ID_0001:VIW_MAIN.{id}" value="{v}">"#)
        })
        .collect()
}

fn render_grades(screen: &Screen, knobs: Knobs) -> String {
    let course_type = screen.get(COURSE_TYPE).unwrap_or("UG");
    let mut html = String::new();
    html += &combo(COURSE_TYPE, label(COURSE_TYPES, Some(course_type)), COURSE_TYPES);
    html += &combo(G_YEAR, label(YEARS, screen.get(G_YEAR)), YEARS);
    html += &combo(G_SEMESTER, label(SEMESTERS, screen.get(G_SEMESTER)), SEMESTERS);
    html += &summary_inputs(course_type);

    let semesters = if course_type == "UG" {
        owned(&[
            &["2023", "1 학기", "18", "18", "0", "4.2", "75.6", "95.1", "3/40", "10/200", "", "", ""],
            &["2023", "2 학기", "19.5", "19.5", "0.5", "3.9", "76.05", "91.0", "", "", "", "", ""],
        ])
    } else {
        Vec::new()
    };
    html += &table(screen, SEMESTER_TABLE, SEMESTER_HEADERS, Some(&semesters), knobs.page_rows);

    let term = (screen.get(G_YEAR), screen.get(G_SEMESTER));
    let classes = if course_type == "UG" && term == (Some("2023"), Some("090")) {
        let button = format!(r#"<a ct="B" id="{DETAIL_BUTTON}21500001"></a>"#);
        owned(&[
            &["2023", "1 학기", "21500001", "자료구조", "3", "95", "A+", "김교수", &button],
            &["2023", "1 학기", "21500002", "채플", "0.5", "P", "P", "", ""],
        ])
    } else {
        Vec::new()
    };
    html += &table(screen, CLASS_TABLE, CLASS_HEADERS, Some(&classes), knobs.page_rows);
    html
}
