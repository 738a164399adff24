//! QuickJS-backed formula evaluation
//!
//! Every evaluation gets a fresh runtime on its own worker thread. The
//! runtime's interrupt handler aborts the script once the deadline passes or
//! the caller cancels; QuickJS raises that as an exception the script cannot
//! catch, so synchronous infinite loops terminate too.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Function, Runtime, Value};

use crate::format::number::js_number_string;

use super::options::{FormulaError, FormulaOptions};
use super::output::{render, ScriptValue};

/// How long the caller waits past the budget before abandoning the worker
const WORKER_GRACE: Duration = Duration::from_millis(250);

/// Strips the global object down to the names a formula may use and
/// evaluates to the compiler for formula bodies.
///
/// The compiler keeps private handles to `Function` and friends. A body that
/// closes the generated function early compiles to a different source text
/// than the one requested and is rejected as a syntax error.
const PRELUDE: &str = r#"
(function () {
  var g = globalThis;
  var F = Function;
  var apply = Reflect.apply;
  var source = Function.prototype.toString;
  var Syntax = SyntaxError;
  var marker = "/*body*/";
  var shape = apply(source, new F("data", marker), []).split(marker);
  var keep = [
    "Math", "JSON", "Number", "String", "Boolean", "Date", "Array", "Object",
    "parseInt", "parseFloat", "isNaN", "isFinite",
    "Error", "TypeError", "RangeError", "SyntaxError", "ReferenceError",
    "EvalError", "URIError", "AggregateError", "InternalError",
    "NaN", "Infinity", "undefined"
  ];
  Object.getOwnPropertyNames(g).forEach(function (name) {
    if (keep.indexOf(name) < 0) {
      try { delete g[name]; } catch (e) {}
    }
  });
  return function (code) {
    var body = new F("data", code);
    if (shape.length === 2 && apply(source, body, []) !== shape[0] + code + shape[1]) {
      throw new Syntax("formula code is not a single function body");
    }
    return body;
  };
})()
"#;

/// Per-runtime resource limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Heap limit in bytes
    pub memory_limit: usize,
    /// Native stack limit in bytes
    pub max_stack_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            memory_limit: 32 * 1024 * 1024,
            max_stack_size: 512 * 1024,
        }
    }
}

/// One formula to evaluate as part of a batch
#[derive(Debug, Clone)]
pub struct FormulaJob<'a> {
    pub code: &'a str,
    pub data: &'a serde_json::Value,
    pub options: FormulaOptions,
}

/// Evaluates user formulas in isolated QuickJS runtimes
#[derive(Debug, Clone, Default)]
pub struct FormulaSandbox {
    limits: SandboxLimits,
}

impl FormulaSandbox {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SandboxLimits {
        self.limits
    }

    /// Run `code` as a function body with `data` in scope.
    ///
    /// Never fails: script errors and timeouts are rendered according to
    /// `options.error_handling`.
    pub fn evaluate(&self, code: &str, data: &serde_json::Value, options: &FormulaOptions) -> String {
        if code.trim().is_empty() {
            return options.default_value.clone();
        }
        render(self.run(code, data, options.timeout), options)
    }

    /// Evaluate independent formulas in parallel; results follow job order
    pub fn evaluate_all(&self, jobs: &[FormulaJob<'_>]) -> Vec<String> {
        thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|job| scope.spawn(move || self.evaluate(job.code, job.data, &job.options)))
                .collect();

            handles
                .into_iter()
                .zip(jobs)
                .map(|(handle, job)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| render(Err(FormulaError::WorkerLost), &job.options))
                })
                .collect()
        })
    }

    /// Evaluate on a worker thread and wait for it, at most slightly past the budget
    pub fn run(
        &self,
        code: &str,
        data: &serde_json::Value,
        timeout: Duration,
    ) -> Result<ScriptValue, FormulaError> {
        let payload =
            serde_json::to_string(data).map_err(|e| FormulaError::Setup(e.to_string()))?;
        let code = code.to_string();
        let limits = self.limits;
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("formula".to_string())
            .spawn(move || {
                let outcome = execute(&code, &payload, timeout, limits, worker_cancel);
                // The caller may have given up already
                let _ = tx.send(outcome);
            })
            .map_err(|e| FormulaError::Setup(e.to_string()))?;

        match rx.recv_timeout(timeout + WORKER_GRACE) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                tracing::warn!(budget_ms = timeout.as_millis() as u64, "abandoning formula worker");
                Err(FormulaError::timeout(timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(FormulaError::WorkerLost),
        }
    }
}

fn execute(
    code: &str,
    payload: &str,
    timeout: Duration,
    limits: SandboxLimits,
    cancel: Arc<AtomicBool>,
) -> Result<ScriptValue, FormulaError> {
    let setup = |e: rquickjs::Error| FormulaError::Setup(e.to_string());

    let runtime = Runtime::new().map_err(setup)?;
    runtime.set_memory_limit(limits.memory_limit);
    runtime.set_max_stack_size(limits.max_stack_size);

    // Armed after setup; the budget covers the formula only
    let deadline = Arc::new(OnceLock::<Instant>::new());
    let flag = Arc::clone(&cancel);
    let armed = Arc::clone(&deadline);
    runtime.set_interrupt_handler(Some(Box::new(move || {
        flag.load(Ordering::Relaxed) || expired(&armed)
    })));

    let context = Context::full(&runtime).map_err(setup)?;
    let outcome = context.with(|ctx| run_script(ctx, code, payload, timeout, &deadline));

    match outcome {
        Err(err) if cancel.load(Ordering::Relaxed) || expired(&deadline) => {
            tracing::debug!(error = %err, "formula interrupted");
            Err(FormulaError::timeout(timeout))
        }
        other => other,
    }
}

fn expired(deadline: &OnceLock<Instant>) -> bool {
    deadline.get().is_some_and(|at| Instant::now() >= *at)
}

fn run_script<'js>(
    ctx: Ctx<'js>,
    code: &str,
    payload: &str,
    timeout: Duration,
    deadline: &OnceLock<Instant>,
) -> Result<ScriptValue, FormulaError> {
    let compile: Function = ctx
        .eval(PRELUDE)
        .catch(&ctx)
        .map_err(|e| FormulaError::Setup(describe(e)))?;

    let data: Value = ctx
        .json_parse(payload)
        .catch(&ctx)
        .map_err(|e| FormulaError::Setup(describe(e)))?;

    let _ = deadline.set(Instant::now() + timeout);

    let body: Function = compile
        .call((code,))
        .catch(&ctx)
        .map_err(|e| FormulaError::Script(describe(e)))?;
    let value: Value = body
        .call((data,))
        .catch(&ctx)
        .map_err(|e| FormulaError::Script(describe(e)))?;

    to_script_value(&ctx, value)
}

fn to_script_value<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> Result<ScriptValue, FormulaError> {
    if value.is_undefined() || value.is_function() {
        return Ok(ScriptValue::Undefined);
    }
    if value.is_null() {
        return Ok(ScriptValue::Null);
    }
    if let Some(b) = value.as_bool() {
        return Ok(ScriptValue::Bool(b));
    }
    if let Some(n) = value.as_number() {
        return Ok(ScriptValue::Number(n));
    }
    if let Some(s) = value.as_string() {
        let text = s
            .to_string()
            .map_err(|e| FormulaError::Script(e.to_string()))?;
        return Ok(ScriptValue::String(text));
    }

    let json = ctx
        .json_stringify(value)
        .catch(ctx)
        .map_err(|e| FormulaError::Script(describe(e)))?;
    match json {
        Some(json) => {
            let text = json
                .to_string()
                .map_err(|e| FormulaError::Script(e.to_string()))?;
            serde_json::from_str(&text)
                .map(ScriptValue::Structured)
                .map_err(|e| FormulaError::Script(e.to_string()))
        }
        None => Ok(ScriptValue::Undefined),
    }
}

/// Message of a caught script error
fn describe(err: CaughtError<'_>) -> String {
    match err {
        CaughtError::Exception(exception) => exception
            .message()
            .unwrap_or_else(|| exception.to_string()),
        CaughtError::Value(value) => {
            if let Some(s) = value.as_string() {
                s.to_string().unwrap_or_default()
            } else if let Some(n) = value.as_number() {
                js_number_string(n)
            } else {
                "uncaught exception".to_string()
            }
        }
        CaughtError::Error(error) => error.to_string(),
    }
}
