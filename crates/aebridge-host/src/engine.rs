//! Request evaluation: runs parsed scripts against the scene and encodes the
//! response body the way the panel endpoint does

use serde_json::{json, Value as Json};
use tracing::{debug, warn};

use crate::{
    error::{HostError, HostResult},
    registry::HostRegistry,
    scene::{HostValue, ObjRef, Scene},
    script::{self, Expr, Request},
};

/// Line the client's code starts on inside the exception guard
const GUARDED_LINE: i64 = 2;

/// The simulated scripting engine: one scene plus the registry global
#[derive(Debug, Default)]
pub struct HostEngine {
    scene: Scene,
    registry: HostRegistry,
}

impl HostEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Evaluate one request body and produce the response text
    pub fn handle(&mut self, code: &str) -> String {
        let code = script::unguard(code);
        match self.run(code) {
            Ok(body) => body,
            Err(err) => {
                warn!(name = err.name(), message = %err, "script raised");
                json!({
                    "error": true,
                    "message": err.to_string(),
                    "name": err.name(),
                    "line": GUARDED_LINE,
                })
                .to_string()
            }
        }
    }

    fn run(&mut self, code: &str) -> HostResult<String> {
        match script::parse_request(code)? {
            Request::Prelude => {
                self.registry.install();
                Ok("true".to_string())
            }
            Request::Register(statements) => {
                let value = self.eval_all(&statements)?;
                if value == HostValue::Undefined {
                    return Ok("undefined".to_string());
                }
                let described = self.describe(&value)?;
                debug!(%described, "registered result");
                Ok(described.to_string())
            }
            Request::Raw(statements) => {
                let value = self.eval_all(&statements)?;
                Ok(self.stringify(&value))
            }
        }
    }

    fn eval_all(&mut self, statements: &[Expr]) -> HostResult<HostValue> {
        let mut last = HostValue::Undefined;
        for statement in statements {
            last = self.eval(statement)?;
        }
        Ok(last)
    }

    fn eval(&mut self, expr: &Expr) -> HostResult<HostValue> {
        match expr {
            Expr::Undefined => Ok(HostValue::Undefined),
            Expr::Null => Ok(HostValue::Null),
            Expr::Bool(b) => Ok(HostValue::Bool(*b)),
            Expr::Number(n) => Ok(HostValue::Number(*n)),
            Expr::Str(s) => Ok(HostValue::Str(s.clone())),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<HostResult<Vec<_>>>()
                .map(HostValue::Array),
            Expr::Ident(name) => match name.as_str() {
                "app" => Ok(HostValue::Object(self.scene.app())),
                _ => Err(HostError::reference(format!("{name} is undefined"))),
            },
            Expr::Registry(id) => Ok(self
                .registry
                .lookup(id)?
                .map_or(HostValue::Undefined, HostValue::Object)),
            Expr::Member(target, name) => {
                if let Expr::Ident(namespace) = target.as_ref() {
                    if is_namespace(namespace) {
                        // Enumeration constant, e.g. CloseOptions.DO_NOT_SAVE_CHANGES
                        return Ok(HostValue::Str(format!("{namespace}.{name}")));
                    }
                }
                let target = self.eval(target)?;
                self.member(&target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                match target {
                    HostValue::Object(r) => self.scene.index(r, &index),
                    HostValue::Array(items) => Ok(match index {
                        HostValue::Number(n) if n >= 0.0 && n.fract() == 0.0 => items
                            .get(n as usize)
                            .cloned()
                            .unwrap_or(HostValue::Undefined),
                        _ => HostValue::Undefined,
                    }),
                    other => Err(not_an_object(&other)),
                }
            }
            Expr::Call(callee, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<HostResult<Vec<_>>>()?;
                match callee.as_ref() {
                    Expr::Ident(name) => self.scene.call_global(name, &args),
                    Expr::Member(target, method) => match self.eval(target)? {
                        HostValue::Object(r) => self.scene.call(r, method, &args),
                        other => Err(HostError::type_error(format!(
                            "{} has no method {method}",
                            self.stringify(&other)
                        ))),
                    },
                    _ => Err(HostError::type_error("expression is not a function")),
                }
            }
            Expr::New(class, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<HostResult<Vec<_>>>()?;
                self.scene.construct(class, &args)
            }
            Expr::Assign(target, value) => {
                let value = self.eval(value)?;
                match target.as_ref() {
                    Expr::Member(object, name) => match self.eval(object)? {
                        HostValue::Object(r) => self.scene.set(r, name, value),
                        other => Err(not_an_object(&other)),
                    },
                    _ => Err(HostError::reference("Invalid assignment target")),
                }
            }
            Expr::StrictEq(left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(HostValue::Bool(strict_equals(&left, &right)))
            }
        }
    }

    fn member(&self, target: &HostValue, name: &str) -> HostResult<HostValue> {
        match target {
            HostValue::Object(r) => self.scene.get(*r, name),
            HostValue::Array(items) if name == "length" => {
                Ok(HostValue::Number(items.len() as f64))
            }
            HostValue::Str(s) if name == "length" => {
                Ok(HostValue::Number(s.encode_utf16().count() as f64))
            }
            HostValue::Undefined | HostValue::Null => Err(not_an_object(target)),
            _ => Ok(HostValue::Undefined),
        }
    }

    /// Register objects in a result and encode it as JSON
    fn describe(&mut self, value: &HostValue) -> HostResult<Json> {
        Ok(match value {
            HostValue::Undefined | HostValue::Null => Json::Null,
            HostValue::Bool(b) => json!(b),
            HostValue::Number(n) => number_json(*n),
            HostValue::Str(s) => json!(s),
            HostValue::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.describe(item))
                    .collect::<HostResult<Vec<_>>>()?,
            ),
            HostValue::Object(r) => self.describe_object(*r)?,
        })
    }

    fn describe_object(&mut self, r: ObjRef) -> HostResult<Json> {
        let id = self.registry.register(r)?;
        Ok(json!({
            "isObject": true,
            "objectType": self.scene.class_of(r),
            "pydobeId": id,
        }))
    }

    /// String conversion of a raw script's result
    fn stringify(&self, value: &HostValue) -> String {
        match value {
            HostValue::Undefined => "undefined".to_string(),
            HostValue::Null => "null".to_string(),
            HostValue::Bool(b) => b.to_string(),
            HostValue::Number(n) => number_json(*n).to_string(),
            HostValue::Str(s) => s.clone(),
            HostValue::Array(items) => items
                .iter()
                .map(|item| self.stringify(item))
                .collect::<Vec<_>>()
                .join(","),
            HostValue::Object(r) => format!("[object {}]", self.scene.class_of(*r)),
        }
    }
}

/// Capitalised globals holding enumeration constants
fn is_namespace(name: &str) -> bool {
    !matches!(name, "File" | "Folder" | "ImportOptions")
        && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn not_an_object(value: &HostValue) -> HostError {
    let shown = match value {
        HostValue::Undefined => "undefined",
        HostValue::Null => "null",
        _ => "value",
    };
    HostError::type_error(format!("{shown} is not an object"))
}

fn strict_equals(left: &HostValue, right: &HostValue) -> bool {
    match (left, right) {
        // Arrays compare by identity, and every evaluation builds a new one
        (HostValue::Array(_), HostValue::Array(_)) => false,
        (a, b) => a == b,
    }
}

/// Integral numbers encode without a fraction, like the engine's JSON
fn number_json(n: f64) -> Json {
    const SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= SAFE_INTEGER {
        json!(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PRELUDE: &str = "if (typeof $._pydobe === 'undefined') { $._pydobe = {}; }\ntrue;";

    fn register(line: &str) -> String {
        format!(
            "var tmp = {line}\n\
             var __pydobeDescribe = function (v) {{ }};\n\
             ExtendJSON.stringify(__pydobeDescribe(tmp));"
        )
    }

    fn engine() -> HostEngine {
        let mut engine = HostEngine::new();
        assert_eq!(engine.handle(PRELUDE), "true");
        engine
    }

    #[test]
    fn test_registration_returns_descriptor() {
        let mut engine = engine();
        let body: Json = serde_json::from_str(&engine.handle(&register("app.project;"))).unwrap();
        assert_eq!(
            body,
            json!({"isObject": true, "objectType": "Project", "pydobeId": "p1"})
        );
        assert_eq!(engine.handle(&register(r#"$._pydobe["p1"].numItems;"#)), "0");
        assert_eq!(engine.handle(&register(r#"$._pydobe["p1"].bitsPerChannel;"#)), "8");
    }

    #[test]
    fn test_same_object_twice_gets_two_ids() {
        let mut engine = engine();
        engine.handle(&register("app;"));
        engine.handle(&register("app;"));
        assert_eq!(engine.registry().len(), 2);
        assert_eq!(
            engine.handle(&register(r#"$._pydobe["p1"] === $._pydobe["p2"];"#)),
            "true"
        );
    }

    #[test]
    fn test_errors_are_reported_as_data() {
        let mut engine = engine();
        let body: Json = serde_json::from_str(&engine.handle(&register("app.foo();"))).unwrap();
        assert_eq!(body["error"], json!(true));
        assert_eq!(body["message"], json!("foo is not a function"));
        assert_eq!(body["name"], json!("TypeError"));

        let body: Json =
            serde_json::from_str(&engine.handle(&register(r#"$._pydobe["p7"].name;"#))).unwrap();
        assert_eq!(body["name"], json!("TypeError"));
    }

    #[test]
    fn test_registration_needs_prelude() {
        let mut engine = HostEngine::new();
        let body: Json = serde_json::from_str(&engine.handle(&register("app;"))).unwrap();
        assert_eq!(body["error"], json!(true));
    }

    #[test]
    fn test_guarded_raw_code() {
        let mut engine = engine();
        let guarded = "try{\napp.project.bitsPerChannel = 16; app.project.bitsPerChannel;\n}\
                       catch(e){e.error=true;ExtendJSON.stringify(e)}";
        assert_eq!(engine.handle(guarded), "16");
        assert_eq!(engine.handle("app.version;"), "24.0.0");
        assert_eq!(engine.handle("app.project;"), "[object Project]");
    }

    #[test]
    fn test_arrays_describe_element_wise() {
        let mut engine = engine();
        engine.handle(&register(r#"app.open(File("/projects/a.aep"));"#));
        let used_in = engine.handle(&register("app.project.rootFolder.items[1].usedIn;"));
        let body: Json = serde_json::from_str(&used_in).unwrap();
        assert_eq!(body, json!([]));

        engine.handle(&register(r#"app.project.item(4).selected = true;"#));
        let body: Json =
            serde_json::from_str(&engine.handle(&register("app.project.selection;"))).unwrap();
        assert_eq!(
            body,
            json!([{"isObject": true, "objectType": "CompItem", "pydobeId": "p2"}])
        );
    }

    #[test]
    fn test_enumeration_constants_pass_through() {
        let mut engine = engine();
        assert_eq!(
            engine.handle(&register("app.project.close(CloseOptions.DO_NOT_SAVE_CHANGES);")),
            "true"
        );
        assert_eq!(
            engine.handle(&register(
                "timeToCurrentFormat(app.project.bitsPerChannel, 4);"
            )),
            r#""0:00:08:00""#
        );
    }

    #[test]
    fn test_number_encoding() {
        assert_eq!(number_json(3.0), json!(3));
        assert_eq!(number_json(0.5), json!(0.5));
        assert_eq!(number_json(f64::NAN), Json::Null);
    }
}
