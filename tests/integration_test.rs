// Integration tests for userboard

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use userboard::remote::{HttpUserSource, UserSource};
use userboard::{LoadError, UserStore};

fn temp_path(tag: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    path.push(format!("userboard_{tag}_{}_{}.conf", std::process::id(), nonce));
    path
}

/// Answer exactly one request on a local port with a fixed status and body.
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/users")
}

fn local_source(url: String) -> HttpUserSource {
    let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
    HttpUserSource::with_client(client, url)
}

// 1) A 200 with a JSON array populates the store
#[test]
fn http_array_loads_into_store() {
    let url = serve_once(
        "200 OK",
        r#"[{"id":1,"name":"Leanne Graham","username":"Bret","email":"Sincere@april.biz","phone":"1-770-736-8031","website":"hildegard.org"},
            {"id":2,"name":"Ervin Howell","username":"Antonette","email":"Shanna@melissa.tv","phone":"010-692-6593"}]"#,
    );
    let store = UserStore::load_from(&local_source(url));
    assert!(!store.is_loading());
    assert!(store.error().is_none());
    assert_eq!(store.users().len(), 2);
    assert_eq!(store.users()[1].username, "Antonette");
}

// 2) Non-success status becomes a network error
#[test]
fn http_500_is_a_network_error() {
    let url = serve_once("500 Internal Server Error", "{}");
    let res = local_source(url.clone()).fetch_users();
    assert_eq!(res, Err(LoadError::Network { status: 500 }));

    let url = serve_once("500 Internal Server Error", "{}");
    let store = UserStore::load_from(&local_source(url));
    assert_eq!(store.error(), Some("HTTP error: 500"));
    assert!(store.users().is_empty());
    assert!(!store.is_loading());
}

// 3) A JSON object instead of a list is malformed
#[test]
fn http_object_body_is_malformed() {
    let url = serve_once("200 OK", r#"{"users":[]}"#);
    assert_eq!(local_source(url).fetch_users(), Err(LoadError::Malformed));
}

// 4) Nothing listening is a transport failure
#[test]
fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let res = local_source(format!("http://{addr}/users")).fetch_users();
    assert!(matches!(res, Err(LoadError::Transport(_))));
}

// 5) Background load delivered through the store
#[test]
fn spawned_fetch_finishes_through_the_store() {
    let url = serve_once("200 OK", r#"[{"id":7,"name":"Kurtis","username":"k","email":"k@w.io","phone":""}]"#);
    let mut store = UserStore::new();
    let pending = store.spawn_fetch(local_source(url)).expect("first fetch spawns");
    assert!(store.spawn_fetch(local_source("http://127.0.0.1:9/".into())).is_none());
    let outcome = pending.wait();
    assert!(store.finish_load(outcome));
    assert_eq!(store.users()[0].id, 7);
    assert!(!store.is_loading());
}

// 6) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    use userboard::app::Theme;

    let path = temp_path("theme");
    let path_str = path.to_string_lossy().to_string();

    let t = Theme::mocha();
    t.write_file(&path_str).expect("write theme");
    let t2 = Theme::from_file(&path_str).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.border), format!("{:?}", t2.border));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));

    let init = temp_path("theme_init");
    let init_str = init.to_string_lossy().to_string();
    let _ = std::fs::remove_file(&init);
    let _created = Theme::load_or_init(&init_str);
    assert!(init.exists());

    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(&init);
}

// 7) Theme files tolerate junk lines
#[test]
fn theme_from_file_skips_bad_lines() {
    use ratatui::style::Color;
    use userboard::app::Theme;

    let path = temp_path("theme_bad");
    std::fs::write(
        &path,
        "# comment\nnot a pair\nerror = #zzzzzz\nunknown = #010203\ntext = #102030\n",
    )
    .expect("write");
    let t = Theme::from_file(&path.to_string_lossy()).expect("read");
    assert_eq!(t.text, Color::Rgb(0x10, 0x20, 0x30));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", Theme::mocha().error));
    let _ = std::fs::remove_file(&path);
}

// 8) Keybindings survive a write/read cycle
#[test]
fn keymap_roundtrip() {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use userboard::app::{KeyAction, Keymap};

    let path = temp_path("keys");
    let path_str = path.to_string_lossy().to_string();
    std::fs::write(&path, "NewUser = Ctrl+n\n").expect("write");
    let km = Keymap::from_file(&path_str).expect("read");
    let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
    assert_eq!(km.resolve(&ctrl_n), Some(KeyAction::NewUser));

    km.write_file(&path_str).expect("rewrite");
    let again = Keymap::from_file(&path_str).expect("reread");
    assert_eq!(again.resolve(&ctrl_n), Some(KeyAction::NewUser));
    assert_eq!(
        again.resolve(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
        Some(KeyAction::Quit)
    );
    let _ = std::fs::remove_file(&path);
}
