//! In-process bundling engine.
//!
//! Reads and writes the luabundle text format:
//!
//! ```text
//! -- Bundled by luabundle {"luaVersion":"5.2","rootModuleName":"__root","version":"1.6.0"}
//! local __bundle_require, __bundle_loaded, __bundle_register, __bundle_modules =
//!     (function(superRequire)
//!     ...loader...
//! end)(nil)
//! __bundle_register("__root", function(require, _LOADED, __bundle_register, __bundle_modules)
//! <root script>
//! end)
//! __bundle_register("util", function(require, _LOADED, __bundle_register, __bundle_modules)
//! <module source>
//! end)
//! return __bundle_require("__root")
//! ```

use crate::engine::{
    BUNDLE_SIGNATURE, BundleEngine, BundleOptions, Metadata, Module, ModuleMap, UnbundledData,
};
use crate::error::{BundleError, Result};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

/// luabundle release whose output format this engine reproduces.
pub const LUABUNDLE_VERSION: &str = "1.6.0";

const REGISTER_PREFIX: &str = "__bundle_register(";
const REGISTER_PARAMS: &str = ", function(require, _LOADED, __bundle_register, __bundle_modules)";
const MODULE_END: &str = "\nend)\n";
const ENTRY_PREFIX: &str = "return __bundle_require(";

const PRELUDE: &str = "local __bundle_require, __bundle_loaded, __bundle_register, \
                       __bundle_modules = (function(superRequire)
\tlocal loadingPlaceholder = {[{}] = true}

\tlocal register
\tlocal modules = {}

\tlocal require
\tlocal loaded = {}

\tregister = function(name, body)
\t\tif not modules[name] then
\t\t\tmodules[name] = body
\t\tend
\tend

\trequire = function(name)
\t\tlocal loadedModule = loaded[name]

\t\tif loadedModule then
\t\t\tif loadedModule == loadingPlaceholder then
\t\t\t\treturn nil
\t\t\tend
\t\telse
\t\t\tif not modules[name] then
\t\t\t\tif not superRequire then
\t\t\t\t\tlocal identifier = type(name) == 'string' and '\\\"' .. name .. '\\\"' or tostring(name)
\t\t\t\t\terror('Tried to require ' .. identifier .. ', but no such module has been registered')
\t\t\t\telse
\t\t\t\t\treturn superRequire(name)
\t\t\t\tend
\t\t\tend

\t\t\tloaded[name] = loadingPlaceholder
\t\t\tloadedModule = modules[name](require, loaded, register, modules)
\t\t\tloaded[name] = loadedModule
\t\tend

\t\treturn loadedModule
\tend

\treturn require, loaded, register, modules
end)";


/// Bundling engine running inside the current process.
///
/// Module files written with [`BundleEngine::write_files`] live in memory
/// until the engine is shut down.
///
/// # Examples
///
/// ```
/// use tts_luabundle::{BundleEngine, BundleOptions, ModuleMap, NativeEngine};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut engine = NativeEngine::new();
/// engine.start()?;
///
/// let mut files = ModuleMap::new();
/// files.insert("util".to_string(), "return {}".to_string());
/// engine.write_files(&files)?;
///
/// let bundle = engine.bundle_string("local util = require(\"util\")", &BundleOptions::default())?;
/// let unbundled = engine.unbundle_string(&bundle)?;
/// assert_eq!(unbundled.modules["util"].content, "return {}");
///
/// engine.shutdown()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct NativeEngine {
    files: ModuleMap,
    running: bool,
}

impl NativeEngine {
    /// Creates a stopped engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(BundleError::EngineNotRunning)
        }
    }

    fn resolve(&self, name: &str, options: &BundleOptions) -> Result<&str> {
        options
            .paths
            .iter()
            .find_map(|template| self.files.get(&template.replace('?', name)))
            .map(String::as_str)
            .ok_or_else(|| BundleError::UnresolvedModule {
                name: name.to_string(),
            })
    }

    /// Collects every module `source` transitively requires, in first-use order.
    fn collect_modules(
        &self,
        source: &str,
        options: &BundleOptions,
        seen: &mut HashSet<String>,
        modules: &mut Vec<(String, String)>,
    ) -> Result<()> {
        for name in find_requires(source) {
            if !seen.insert(name.clone()) {
                continue;
            }
            let content = self.resolve(&name, options)?.to_string();
            modules.push((name, content.clone()));
            self.collect_modules(&content, options, seen, modules)?;
        }
        Ok(())
    }
}

impl BundleEngine for NativeEngine {
    fn start(&mut self) -> Result<()> {
        self.running = true;
        tracing::debug!("Started native bundle engine");
        Ok(())
    }

    fn write_files(&mut self, files: &ModuleMap) -> Result<()> {
        self.ensure_running()?;
        self.files
            .extend(files.iter().map(|(name, content)| (name.clone(), content.clone())));
        Ok(())
    }

    fn bundle_string(&mut self, script: &str, options: &BundleOptions) -> Result<String> {
        self.ensure_running()?;

        let mut seen = HashSet::new();
        let mut modules = Vec::new();
        self.collect_modules(script, options, &mut seen, &mut modules)?;

        let mut out = String::with_capacity(PRELUDE.len() + script.len());
        if options.metadata {
            let metadata = Metadata {
                lua_version: options.lua_version.clone(),
                root_module_name: options.root_module_name.clone(),
                version: LUABUNDLE_VERSION.to_string(),
            };
            out.push_str(BUNDLE_SIGNATURE);
            out.push_str(&serde_json::to_string(&metadata)?);
            out.push('\n');
        }
        out.push_str(PRELUDE);
        out.push_str(if options.isolate { "(nil)\n" } else { "(require)\n" });

        push_module(&mut out, &options.root_module_name, script)?;
        for (name, content) in &modules {
            push_module(&mut out, name, content)?;
        }

        out.push_str(ENTRY_PREFIX);
        out.push_str(&serde_json::to_string(&options.root_module_name)?);
        out.push(')');

        tracing::debug!("Bundled script with {} modules", modules.len());
        Ok(out)
    }

    fn unbundle_string(&mut self, script: &str) -> Result<UnbundledData> {
        self.ensure_running()?;
        parse_bundle(script)
    }

    fn shutdown(&mut self) -> Result<()> {
        self.files.clear();
        self.running = false;
        tracing::debug!("Shut down native bundle engine");
        Ok(())
    }
}

fn push_module(out: &mut String, name: &str, content: &str) -> Result<()> {
    out.push_str(REGISTER_PREFIX);
    out.push_str(&serde_json::to_string(name)?);
    out.push_str(REGISTER_PARAMS);
    out.push('\n');
    out.push_str(content);
    out.push_str(MODULE_END);
    Ok(())
}

fn malformed(reason: impl Into<String>) -> BundleError {
    BundleError::MalformedBundle {
        reason: reason.into(),
    }
}

/// Splits a bundle produced in the luabundle format.
fn parse_bundle(script: &str) -> Result<UnbundledData> {
    let rest = script
        .strip_prefix(BUNDLE_SIGNATURE)
        .ok_or_else(|| malformed("missing bundle signature"))?;
    let (header, body) = rest
        .split_once('\n')
        .ok_or_else(|| malformed("bundle has no body"))?;
    let metadata: Metadata = serde_json::from_str(header.trim_end())
        .map_err(|e| malformed(format!("invalid metadata: {e}")))?;

    // (name, start of the register line, start of the module source)
    let mut registrations: Vec<(String, usize, usize)> = Vec::new();
    let mut entry = None;
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if let Some(args) = line.strip_prefix(REGISTER_PREFIX) {
            let name = parse_register_name(args)?;
            registrations.push((name, offset, offset + line.len()));
        } else if line.starts_with(ENTRY_PREFIX) {
            entry = Some(offset);
        }
        offset += line.len();
    }

    let entry = entry.ok_or_else(|| malformed("missing bundle entry point"))?;

    let mut modules = BTreeMap::new();
    for (index, (name, _, content_start)) in registrations.iter().enumerate() {
        let end = registrations
            .get(index + 1)
            .map_or(entry, |(_, next_start, _)| *next_start);
        let block = body
            .get(*content_start..end)
            .ok_or_else(|| malformed(format!("module {name} overlaps the entry point")))?;
        let content = block
            .strip_suffix(MODULE_END)
            .ok_or_else(|| malformed(format!("module {name} is not terminated")))?;

        // The loader keeps the first registration of a name.
        modules.entry(name.clone()).or_insert_with(|| Module {
            name: name.clone(),
            content: content.to_string(),
        });
    }

    Ok(UnbundledData { metadata, modules })
}

fn parse_register_name(args: &str) -> Result<String> {
    let end = args
        .find(REGISTER_PARAMS)
        .ok_or_else(|| malformed("unrecognised module registration"))?;
    serde_json::from_str(&args[..end])
        .map_err(|e| malformed(format!("invalid module name {}: {e}", &args[..end])))
}

/// Returns the module names passed to `require` with a string literal,
/// in order of first appearance. Comments and the contents of other string
/// literals are ignored.
///
/// # Examples
///
/// ```
/// use tts_luabundle::find_requires;
///
/// let source = "local a = require(\"a\")\n-- require('b')\nprint(\"require('c')\")";
/// assert_eq!(find_requires(source), vec!["a"]);
/// ```
#[must_use]
pub fn find_requires(source: &str) -> Vec<String> {
    let bytes = source.as_bytes();
    // Code seen so far, with comments dropped and string literals emptied
    let mut code = String::with_capacity(source.len());
    let mut names: Vec<String> = Vec::new();
    let mut copied_from = 0;
    let mut i = 0;

    while i < bytes.len() {
        let literal = match bytes[i] {
            b'"' | b'\'' => Some(quoted_literal(bytes, i)),
            b'[' => long_bracket_level(bytes, i).map(|level| long_literal(source, i, level)),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                code.push_str(&source[copied_from..i]);
                let start = i + 2;
                i = long_bracket_level(bytes, start).map_or_else(
                    || {
                        bytes[start..]
                            .iter()
                            .position(|&b| b == b'\n')
                            .map_or(bytes.len(), |p| start + p)
                    },
                    |level| long_literal(source, start, level).next,
                );
                copied_from = i;
                continue;
            }
            _ => None,
        };

        let Some(literal) = literal else {
            i += 1;
            continue;
        };

        code.push_str(&source[copied_from..i]);
        if is_require_call(&code) {
            let name = &source[literal.body.clone()];
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        code.push_str("\"\"");
        i = literal.next;
        copied_from = i;
    }

    names
}

/// A string literal located in Lua source.
struct Literal {
    /// Byte range of the literal's contents
    body: Range<usize>,
    /// Offset just past the literal
    next: usize,
}

/// Returns true if `code` ends with `require` or `require(`, so that a
/// string literal following it is the module name.
fn is_require_call(code: &str) -> bool {
    let before = code.trim_end();
    let before = before.strip_suffix('(').map_or(before, str::trim_end);
    before.strip_suffix("require").is_some_and(|prefix| {
        !prefix.ends_with(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | ':'))
    })
}

/// Locates the quoted string starting at `start`. Unterminated strings end
/// at the line break.
fn quoted_literal(bytes: &[u8], start: usize) -> Literal {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => {
                return Literal {
                    body: start + 1..i,
                    next: i + 1,
                };
            }
            _ => i += 1,
        }
    }
    let end = i.min(bytes.len());
    Literal {
        body: start + 1..end,
        next: end,
    }
}

/// Level of a `[==[` opening bracket at `i`, if there is one.
fn long_bracket_level(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    let mut level = 0;
    while bytes.get(i + 1 + level) == Some(&b'=') {
        level += 1;
    }
    (bytes.get(i + 1 + level) == Some(&b'[')).then_some(level)
}

/// Locates the long-bracket string or comment body opened at `start`.
fn long_literal(source: &str, start: usize, level: usize) -> Literal {
    let close = format!("]{}]", "=".repeat(level));
    let body_start = start + level + 2;
    source[body_start..].find(&close).map_or(
        Literal {
            body: body_start..source.len(),
            next: source.len(),
        },
        |p| Literal {
            body: body_start..body_start + p,
            next: body_start + p + close.len(),
        },
    )
}
