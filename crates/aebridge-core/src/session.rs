//! Remote object registry and evaluator
//!
//! Every evaluation that produces a live object registers it host-side under a
//! fresh identifier in the registry global and hands back a descriptor.
//! Primitives come back directly. The registry is never pruned within a host
//! session.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    codec::{self, Response, Value},
    config::{BridgeConfig, REGISTRY_ACCESSOR},
    dispatch,
    error::{BridgeError, Result},
    objects::Application,
    proxy::{Handle, Remote, RemoteObject},
    transport::{HttpTransport, Transport},
};

/// Name of the host-side temporary holding the evaluated line
const RESULT_TEMPORARY: &str = "tmp";

/// A connection to one host session.
///
/// The transport sits behind a mutex so a session never has two evaluations
/// in flight at once.
pub struct Session {
    config: BridgeConfig,
    transport: Mutex<Box<dyn Transport>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.config.endpoint_url())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect over HTTP: validate the dispatch table, probe the endpoint and
    /// install the host registry
    pub fn connect(config: BridgeConfig) -> Result<Arc<Self>> {
        dispatch::validate_dispatch_table()?;

        let transport = HttpTransport::new(&config)?;
        transport.check_live()?;
        info!(address = %config.address(), "connected to host endpoint");

        let session = Arc::new(Self::with_transport(config, Box::new(transport)));
        session.install_registry()?;
        Ok(session)
    }

    /// Build a session on an arbitrary transport
    pub fn with_transport(config: BridgeConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            config,
            transport: Mutex::new(transport),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn check_live(&self) -> Result<()> {
        self.transport.lock().check_live()
    }

    /// Install the registry global and its id generator. Idempotent: an
    /// existing registry is left untouched.
    pub fn install_registry(&self) -> Result<()> {
        self.eval_script(&registry_prelude())?;
        Ok(())
    }

    /// Send raw code and decode the response
    pub fn eval_script(&self, code: &str) -> Result<Value> {
        let raw = {
            let transport = self.transport.lock();
            transport.send(code)?
        };
        match codec::decode(&raw)? {
            Response::Value(value) => Ok(value),
            Response::Error(err) => {
                warn!(message = %err.message, "host evaluation failed");
                Err(err.into())
            }
        }
    }

    /// Evaluate one line, registering any resulting object host-side
    pub fn evaluate(&self, line: &str) -> Result<Value> {
        debug!("evaluate {line}");
        self.eval_script(&registration_script(line))
    }

    /// Evaluate a line and bind the result as a handle
    pub fn evaluate_handle(self: &Arc<Self>, line: &str) -> Result<Option<Handle>> {
        match self.evaluate(line)? {
            Value::Null => Ok(None),
            Value::Object(descriptor) => Ok(Some(Handle::new(self.clone(), descriptor))),
            other => Err(BridgeError::unexpected_value("an object", other.type_name())),
        }
    }

    /// The host's global `app` object
    pub fn application(self: &Arc<Self>) -> Result<Application> {
        let handle = self
            .evaluate_handle("app;")?
            .ok_or_else(|| BridgeError::unexpected_value("the application object", "null"))?;
        Application::from_handle_checked(handle)
    }

    /// Whether two handles refer to the same host object
    pub fn same_object(&self, a: &impl Remote, b: &impl Remote) -> Result<bool> {
        let line = format!(
            "{} === {};",
            a.id().registry_lookup(),
            b.id().registry_lookup()
        );
        codec::FromValue::from_value(self.evaluate(&line)?)
    }
}

/// Host-side script installing the registry global
pub fn registry_prelude() -> String {
    format!(
        "if (typeof {acc} === 'undefined') {{ {acc} = {{}}; }}\n\
         if (typeof {acc}.generateId !== 'function') {{\n\
         \x20   {acc}.nextId = 0;\n\
         \x20   {acc}.generateId = function () {{ {acc}.nextId += 1; return 'p' + {acc}.nextId; }};\n\
         }}\n\
         true;",
        acc = REGISTRY_ACCESSOR
    )
}

/// Wrap a line so objects in its result are registered and described.
///
/// Arrays are walked element by element, so an array of objects comes back
/// as an array of descriptors. The whole result is JSON encoded, which keeps
/// strings distinguishable from numbers.
pub fn registration_script(line: &str) -> String {
    let line = line.trim_end();
    let terminator = if line.ends_with(';') { "" } else { ";" };
    format!(
        "var {tmp} = {line}{terminator}\n\
         var __pydobeDescribe = function (v) {{\n\
         \x20   if (v instanceof Array) {{\n\
         \x20       var out = [];\n\
         \x20       for (var i = 0; i < v.length; i++) {{ out.push(__pydobeDescribe(v[i])); }}\n\
         \x20       return out;\n\
         \x20   }}\n\
         \x20   if (typeof v === 'object' && v !== null) {{\n\
         \x20       var newPydobeId = {acc}.generateId();\n\
         \x20       {acc}[newPydobeId] = v;\n\
         \x20       return {{\"isObject\": true, \"objectType\": v.reflect.name, \"pydobeId\": newPydobeId}};\n\
         \x20   }}\n\
         \x20   return v;\n\
         }};\n\
         ExtendJSON.stringify(__pydobeDescribe({tmp}));",
        tmp = RESULT_TEMPORARY,
        acc = REGISTRY_ACCESSOR
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Arc};

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct MockState {
        responses: VecDeque<String>,
        sent: Vec<String>,
    }

    /// Transport answering from a queue and recording what was sent
    #[derive(Clone, Default)]
    pub struct MockTransport {
        state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        pub fn session() -> (Arc<Session>, MockTransport) {
            let mock = MockTransport::default();
            let session = Arc::new(Session::with_transport(
                BridgeConfig::default(),
                Box::new(mock.clone()),
            ));
            (session, mock)
        }

        pub fn respond(&self, body: impl Into<String>) {
            self.state.lock().responses.push_back(body.into());
        }

        pub fn respond_object(&self, object_type: &str, id: &str) {
            self.respond(format!(
                r#"{{"isObject": true, "objectType": "{object_type}", "pydobeId": "{id}"}}"#
            ));
        }

        pub fn sent(&self) -> Vec<String> {
            self.state.lock().sent.clone()
        }

        /// The evaluated lines, with the registration wrapper stripped
        pub fn sent_lines(&self) -> Vec<String> {
            self.sent()
                .iter()
                .filter_map(|script| {
                    script
                        .lines()
                        .find_map(|l| l.strip_prefix("var tmp = "))
                        .map(str::to_string)
                })
                .collect()
        }
    }

    impl Transport for MockTransport {
        fn check_live(&self) -> Result<()> {
            Ok(())
        }

        fn send(&self, code: &str) -> Result<String> {
            let mut state = self.state.lock();
            state.sent.push(code.to_string());
            Ok(state
                .responses
                .pop_front()
                .unwrap_or_else(|| "undefined".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{testing::MockTransport, *};
    use crate::codec::ObjectDescriptor;

    #[test]
    fn test_registration_script_shape() {
        let script = registration_script("app.project");
        let first = script.lines().next().unwrap();
        assert_eq!(first, "var tmp = app.project;");
        assert!(script.contains("$._pydobe.generateId()"));
        assert!(script.contains("v.reflect.name"));
        assert!(script.ends_with("ExtendJSON.stringify(__pydobeDescribe(tmp));"));
        assert_eq!(
            registration_script("app.project;").lines().next().unwrap(),
            "var tmp = app.project;"
        );
    }

    #[test]
    fn test_evaluate_returns_descriptor_or_scalar() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("Project", "p1");
        mock.respond("3");

        assert_eq!(
            session.evaluate("app.project;").unwrap(),
            Value::Object(ObjectDescriptor::new("Project", "p1"))
        );
        assert_eq!(
            session.evaluate(r#"$._pydobe["p1"].numItems;"#).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_host_error_surfaces_message() {
        let (session, mock) = MockTransport::session();
        mock.respond(r#"{"error": true, "message": "foo is not a function", "name": "TypeError"}"#);

        let err = session.evaluate("app.foo();").unwrap_err();
        assert!(err.is_host_error());
        assert_eq!(err.to_string(), "Host evaluation error: foo is not a function");
    }

    #[test]
    fn test_application_is_bound_from_registry() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("Application", "p1");
        let app = session.application().unwrap();
        assert_eq!(app.id().as_str(), "p1");
        assert_eq!(mock.sent_lines(), vec!["app;"]);
    }

    #[test]
    fn test_application_rejects_other_types() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("Project", "p1");
        assert!(matches!(
            session.application(),
            Err(BridgeError::UnexpectedRemoteType { .. })
        ));
    }

    #[test]
    fn test_prelude_is_idempotent_script() {
        let prelude = registry_prelude();
        assert!(prelude.starts_with("if (typeof $._pydobe === 'undefined')"));
        assert!(prelude.contains("return 'p' + $._pydobe.nextId;"));
    }
}
