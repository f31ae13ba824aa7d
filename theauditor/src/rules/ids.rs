//! Centralized Rule IDs for TheAuditor.

/// Code Execution: `eval()`
pub const RULE_ID_EVAL: &str = "TA-D001";
/// Code Execution: `exec()` or `compile()`
pub const RULE_ID_EXEC: &str = "TA-D002";
/// Code Execution: Command injection in `subprocess`/`os.system`
pub const RULE_ID_SUBPROCESS: &str = "TA-D003";
/// Code Execution: Command injection in async `subprocess`/`popen`
pub const RULE_ID_ASYNC_SUBPROCESS: &str = "TA-D004";
/// Code Execution: unsafe use of `input()`
pub const RULE_ID_INPUT: &str = "TA-D005";

/// Injection: SQL Injection (ORM/Query builders)
pub const RULE_ID_SQL_INJECTION: &str = "TA-D101";
/// Injection: Raw SQL string concatenation
pub const RULE_ID_SQL_RAW: &str = "TA-D102";
/// Injection: Reflected XSS
pub const RULE_ID_XSS: &str = "TA-D103";
/// Injection: Insecure XML parsing (XXE)
pub const RULE_ID_XML: &str = "TA-D104";
/// Injection: `mark_safe` bypassing escaping
pub const RULE_ID_MARK_SAFE: &str = "TA-D105";

/// Deserialization: pickle/dill/shelve
pub const RULE_ID_PICKLE: &str = "TA-D201";
/// Deserialization: Unsafe YAML load
pub const RULE_ID_YAML: &str = "TA-D202";
/// Deserialization: `marshal.load()`
pub const RULE_ID_MARSHAL: &str = "TA-D203";
/// Deserialization: ML model loading (torch, keras, joblib)
pub const RULE_ID_MODEL_DESER: &str = "TA-D204";

/// Cryptography: Weak hashing (MD5)
pub const RULE_ID_MD5: &str = "TA-D301";
/// Cryptography: Weak hashing (SHA1)
pub const RULE_ID_SHA1: &str = "TA-D302";
/// Cryptography: Insecure cipher
pub const RULE_ID_CIPHER: &str = "TA-D304";
/// Cryptography: Insecure cipher mode
pub const RULE_ID_MODE: &str = "TA-D305";
/// Cryptography: Weak PRNG
pub const RULE_ID_RANDOM: &str = "TA-D311";

/// Network: insecure requests (verify=False)
pub const RULE_ID_REQUESTS: &str = "TA-D401";
/// Network: Server-Side Request Forgery (SSRF)
pub const RULE_ID_SSRF: &str = "TA-D402";
/// Network: Debug mode in production
pub const RULE_ID_DEBUG_MODE: &str = "TA-D403";
/// Network: Hardcoded binding to 0.0.0.0
pub const RULE_ID_BIND_ALL: &str = "TA-D404";
/// Network: Requests without timeout
pub const RULE_ID_TIMEOUT: &str = "TA-D405";
/// Network: Insecure `FTP`
pub const RULE_ID_FTP: &str = "TA-D406";
/// Network: `HTTPSConnection` without context
pub const RULE_ID_HTTPS_CONNECTION: &str = "TA-D407";
/// Network: Unverified SSL context
pub const RULE_ID_SSL_UNVERIFIED: &str = "TA-D408";
/// Network: Insecure Telnet
pub const RULE_ID_TELNET: &str = "TA-D409";
/// Network: Insecure URL opening
pub const RULE_ID_URL_OPEN: &str = "TA-D410";
/// Network: `ssl.wrap_socket` usage
pub const RULE_ID_WRAP_SOCKET: &str = "TA-D411";

/// Filesystem: Path traversal
pub const RULE_ID_PATH_TRAVERSAL: &str = "TA-D501";
/// Filesystem: Insecure tarfile extraction
pub const RULE_ID_TARFILE: &str = "TA-D502";
/// Filesystem: Insecure zipfile extraction
pub const RULE_ID_ZIPFILE: &str = "TA-D503";
/// Filesystem: Insecure temp file creation
pub const RULE_ID_TEMPFILE: &str = "TA-D504";
/// Filesystem: Bad file permissions
pub const RULE_ID_PERMISSIONS: &str = "TA-D505";
/// Filesystem: os.tempnam/os.tmpnam
pub const RULE_ID_TEMPNAM: &str = "TA-D506";

/// Type Safety: Method misuse
pub const RULE_ID_METHOD_MISUSE: &str = "TA-D601";

/// Best Practices: Use of assert in production
pub const RULE_ID_ASSERT: &str = "TA-D701";
/// Best Practices: Insecure module import
pub const RULE_ID_INSECURE_IMPORT: &str = "TA-D702";
/// Best Practices: Disabled Jinja2 autoescaping
pub const RULE_ID_JINJA_AUTOESCAPE: &str = "TA-D703";
/// Best Practices: Blacklisted function calls
pub const RULE_ID_BLACKLIST: &str = "TA-D704";

/// Open Redirect (Taint analysis specific)
pub const RULE_ID_OPEN_REDIRECT: &str = "TA-D801";

/// Privacy: Logging of sensitive data
pub const RULE_ID_LOGGING_SENSITIVE: &str = "TA-D901";
/// Privacy: Django `SECRET_KEY` in code
pub const RULE_ID_DJANGO_SECURITY: &str = "TA-D902";

/// XSS (Generic fallback for taint analysis)
pub const RULE_ID_XSS_GENERIC: &str = "TA-X001";
