use std::collections::HashMap;

use axum::http::StatusCode;
use axum_test::TestServer;
use corso::{auth, build_server_with_mm, model::ModelManager, model::entity::UserCreate};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower_cookies::Cookie;

/// Scratch flat-collection backend rooted in a temp directory. The
/// directory lives as long as this value does.
pub struct TestEnv {
    pub mm: ModelManager,
    _data_dir: TempDir,
}

pub async fn setup_env() -> TestEnv {
    let data_dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(data_dir.path()).await.unwrap();

    // seeded admin account; flows sign in with admin/admin
    mm.store()
        .create_user(UserCreate {
            login: "admin".to_string(),
            password_hash: auth::hash_password("admin").unwrap(),
            full_name: "Administrator".to_string(),
            role: "admin".to_string(),
            company: None,
            department: None,
            position: None,
        })
        .await
        .unwrap();

    TestEnv {
        mm,
        _data_dir: data_dir,
    }
}

pub async fn setup_server(env: &TestEnv) -> TestServer {
    let server = build_server_with_mm(env.mm.clone()).await.unwrap().1;
    TestServer::new(server).unwrap()
}

#[derive(Debug)]
pub struct FlowContext {
    pub store: HashMap<&'static str, Value>, // a way to pass data between steps
}

impl FlowContext {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn store(&mut self, key: &'static str, val: Value) {
        self.store.insert(key, val);
    }

    pub fn get(&self, key: &str) -> &Value {
        self.store.get(key).expect("missing store key")
    }

    pub fn get_json<'de, T>(&self, key: &str) -> T
    where
        T: DeserializeOwned,
    {
        let obj = self.get(key);
        let de: T = serde_json::from_value(obj.clone()).expect("Invalid json format");
        de
    }
}

pub struct Action {
    #[allow(unused)]
    pub name: &'static str,
    pub method: &'static str,
    pub path: String,
    pub dyn_path: Option<Box<dyn Fn(&FlowContext) -> String + Send + Sync>>,
    pub body: Option<Value>,
    pub dyn_body: Option<Box<dyn Fn(&FlowContext) -> Value + Send + Sync>>,
    pub expect: StatusCode,
    pub clear_cookies: bool,
    pub save_cookies: bool,
    pub query_params: Vec<(String, String)>,
    pub cookie_asserts: Vec<(&'static str, Box<dyn Fn(&Cookie) + Send + Sync>)>,
    pub body_asserts: Vec<Box<dyn Fn(&str) + Send + Sync>>,
    pub save_as: Option<&'static str>,
}

impl Action {
    pub fn new(name: &'static str, method: &'static str, path: &'static str) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            dyn_path: None,
            body: None,
            dyn_body: None,
            expect: StatusCode::OK,
            clear_cookies: false,
            save_cookies: true,
            query_params: vec![],
            cookie_asserts: vec![],
            body_asserts: vec![],
            save_as: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_expect(mut self, expect: StatusCode) -> Self {
        self.expect = expect;
        self
    }

    pub fn with_save_cookies(mut self, save_cookies: bool) -> Self {
        self.save_cookies = save_cookies;
        self
    }

    pub fn with_clear_cookies(mut self, clear_cookies: bool) -> Self {
        self.clear_cookies = clear_cookies;
        self
    }

    pub fn with_param(mut self, key: &str, val: &str) -> Self {
        self.query_params
            .push((String::from(key), String::from(val)));
        self
    }

    pub fn with_dyn_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> String + Send + Sync + 'static,
    {
        self.dyn_path = Some(Box::new(f));
        self
    }

    #[allow(unused)]
    pub fn with_dyn_body<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> Value + Send + Sync + 'static,
    {
        self.dyn_body = Some(Box::new(f));
        self
    }

    pub fn with_save_as(mut self, key: &'static str) -> Self {
        self.save_as = Some(key);
        self
    }

    pub fn assert_cookie<F>(mut self, name: &'static str, check: F) -> Self
    where
        F: Fn(&Cookie) + Send + Sync + 'static,
    {
        self.cookie_asserts.push((name, Box::new(check)));
        self
    }

    pub fn assert_body<F>(mut self, check: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.body_asserts.push(Box::new(check));
        self
    }
}

pub struct Flow {
    actions: Vec<Action>,
}

impl Flow {
    pub fn new() -> Self {
        Self { actions: vec![] }
    }

    pub fn step(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub async fn run(self, server: &mut TestServer, _env: TestEnv) {
        let mut ctx = FlowContext::new(); // create new context for this flow
        for action in self.actions {
            println!("==> Running test action `{}`", action.name);
            if action.clear_cookies {
                server.clear_cookies();
            }

            if action.save_cookies {
                server.save_cookies();
            } else {
                server.do_not_save_cookies();
            }

            let path = if let Some(dyn_path_fn) = action.dyn_path {
                dyn_path_fn(&ctx)
            } else {
                action.path.clone()
            };

            let mut req = match action.method {
                "GET" => server.get(&path),
                "POST" => server.post(&path),
                "PUT" => server.put(&path),
                "DELETE" => server.delete(&path),
                _ => panic!("unsupported method {}", action.method),
            };

            match (action.dyn_body, action.body) {
                (Some(f), _) => {
                    req = req.json(&f(&ctx));
                }
                (_, Some(json)) => req = req.json(&json),
                _ => {}
            }

            if !action.query_params.is_empty() {
                for (k, v) in action.query_params {
                    req = req.add_query_param(&k, v);
                }
            }

            let resp = req.await;
            resp.assert_status(action.expect);
            let cookies = resp.cookies();

            if !action.cookie_asserts.is_empty() {
                for (cookie_name, check) in action.cookie_asserts {
                    let cookie = cookies
                        .get(cookie_name)
                        .unwrap_or_else(|| panic!("Cookie {} is not set", cookie_name));
                    check(cookie);
                }
            }

            if !action.body_asserts.is_empty() {
                let body = resp.json::<Value>();
                let body = serde_json::to_string(&body)
                    .unwrap_or_else(|_| panic!("Unable to serialize body to string"));
                for check in action.body_asserts {
                    check(&body);
                }
            }

            if let Some(save_key) = action.save_as {
                let body = resp.json::<Value>();
                ctx.store(save_key, body);
            }
        }
    }
}

// Common actions builders

pub fn signup_action(login: &'static str, password: &'static str) -> Action {
    Action::new("signup", "POST", "/api/v1/account/signup").with_body(json!({
        "login": login,
        "password": password,
        "full_name": login,
    }))
}

pub fn signin_action(login: &'static str, password: &'static str) -> Action {
    Action::new("signin", "POST", "/api/v1/account/signin").with_body(json!({
        "login": login,
        "password": password,
    }))
}

pub fn signin_admin_action() -> Action {
    Action::new("signin_admin", "POST", "/api/v1/account/signin").with_body(json!({
        "login": "admin",
        "password": "admin",
    }))
}
