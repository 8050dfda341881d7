//! Deterministic fallbacks for every generation stage.
//!
//! These are the hand-authored substitutes used when the model is
//! unreachable or returns garbage: a fixed three-option stack catalog, a
//! canonical project layout, and per-family template bundles. Everything
//! here is pure; the same inputs always produce the same files.

use indexmap::IndexMap;

use super::models::{
    ComplexityRating, DependencyGroups, FileBundle, ProjectStructure, StackFamily,
    StructureLayout, TechStackOption,
};

fn stack(
    id: u32,
    name: &str,
    language: &str,
    framework: &str,
    database: &str,
    dependencies: &[&str],
    tools: &[&str],
    deployment: &str,
    pros: &[&str],
    cons: &[&str],
    complexity: ComplexityRating,
    estimated_time: &str,
    best_use_case: &str,
) -> TechStackOption {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    TechStackOption {
        id,
        family: StackFamily::classify(name),
        name: name.to_string(),
        language: language.to_string(),
        framework: framework.to_string(),
        database: database.to_string(),
        dependencies: owned(dependencies),
        tools: owned(tools),
        deployment: deployment.to_string(),
        pros: owned(pros),
        cons: owned(cons),
        complexity,
        estimated_time: estimated_time.to_string(),
        best_use_case: best_use_case.to_string(),
    }
}

/// The fixed three-option catalog used when stack suggestion fails.
pub fn fallback_tech_stacks() -> Vec<TechStackOption> {
    vec![
        stack(
            1,
            "Python Django Stack",
            "Python 3.11",
            "Django 4.2",
            "PostgreSQL",
            &["django", "psycopg2", "djangorestframework", "celery"],
            &["pip", "virtualenv", "git", "docker"],
            "Docker + AWS",
            &[
                "Rapid development",
                "Built-in admin",
                "Large ecosystem",
                "Mature framework",
            ],
            &["Monolithic", "Learning curve", "Less flexible"],
            ComplexityRating::Intermediate,
            "4-6 weeks",
            "Web applications with complex business logic",
        ),
        stack(
            2,
            "React Node.js Stack",
            "JavaScript/TypeScript",
            "React 18 + Node.js",
            "MongoDB",
            &["react", "express", "mongoose", "socket.io"],
            &["npm", "webpack", "eslint", "jest"],
            "Vercel + MongoDB Atlas",
            &[
                "Fast development",
                "Rich ecosystem",
                "Scalable",
                "Real-time capable",
            ],
            &["Complex setup", "Many dependencies", "JavaScript fatigue"],
            ComplexityRating::Advanced,
            "6-8 weeks",
            "Modern web applications with real-time features",
        ),
        stack(
            3,
            "Python FastAPI Stack",
            "Python 3.11",
            "FastAPI",
            "SQLite/PostgreSQL",
            &["fastapi", "uvicorn", "sqlalchemy", "pydantic"],
            &["pip", "poetry", "git", "docker"],
            "Docker + Cloud Run",
            &[
                "Fast performance",
                "Auto documentation",
                "Type hints",
                "Modern",
            ],
            &["Newer ecosystem", "Less mature", "Smaller community"],
            ComplexityRating::Intermediate,
            "3-5 weeks",
            "API-first applications and microservices",
        ),
    ]
}

/// Canonical layout substituted when structure generation fails and the
/// caller still wants to proceed.
pub fn fallback_structure(project_name: &str) -> ProjectStructure {
    let dir = |files: &[&str]| files.iter().map(|f| f.to_string()).collect::<Vec<_>>();
    let directories: IndexMap<String, Vec<String>> = [
        ("src/", dir(&["main.py", "config.py", "utils.py"])),
        ("tests/", dir(&["test_main.py", "test_utils.py"])),
        ("docs/", dir(&["README.md", "API.md"])),
        ("config/", dir(&["settings.py", "database.py"])),
        ("scripts/", dir(&["deploy.sh", "setup.py"])),
    ]
    .into_iter()
    .map(|(path, files)| (path.to_string(), files))
    .collect();

    ProjectStructure {
        success: true,
        project_name: project_name.to_string(),
        layout: StructureLayout {
            root_files: dir(&["README.md", "requirements.txt", ".gitignore", ".env.example"]),
            directories,
        },
        dependencies: DependencyGroups {
            main: Vec::new(),
            dev: Vec::new(),
            test: vec!["pytest".to_string()],
        },
        description: "Standard Python project layout".to_string(),
        error: None,
    }
}

/// Wrap an unparseable main-section response as a single file.
pub fn wrap_main_raw(raw: &str) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    files.insert("main.py".to_string(), raw.to_string());
    files
}

/// Wrap an unparseable test-section response as a single file.
pub fn wrap_test_raw(raw: &str) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    files.insert("test_main.py".to_string(), raw.to_string());
    files
}

/// Minimal additional-file set used when that section cannot be decoded.
pub fn fallback_additional_files(requirement: &str) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    files.insert(
        "requirements.txt".to_string(),
        "# Project Dependencies\n\n# Add your dependencies here\n".to_string(),
    );
    files.insert(
        "README.md".to_string(),
        format!("# Project\n\n{requirement}\n"),
    );
    files.insert(
        ".env.example".to_string(),
        "# Environment Variables\n\n# Add your environment variables here\n".to_string(),
    );
    files.insert(
        ".gitignore".to_string(),
        "# Python\n__pycache__/\n*.pyc\n.env\nvenv/\n".to_string(),
    );
    files
}

/// Template bundle for the selected stack family. Guarantees the pipeline
/// always terminates with a non-empty bundle.
pub fn fallback_bundle(family: StackFamily, requirement: &str) -> FileBundle {
    match family {
        StackFamily::DjangoLike => django_bundle(requirement),
        StackFamily::NodeLike => node_bundle(requirement),
        StackFamily::Generic => generic_bundle(requirement),
    }
}

fn section(entries: Vec<(&str, String)>) -> IndexMap<String, String> {
    entries
        .into_iter()
        .map(|(name, content)| (name.to_string(), content))
        .collect()
}

fn python_header(requirement: &str, title: &str) -> String {
    format!("\"\"\"{requirement}\n\n{title}\n\"\"\"\n\n")
}

fn django_bundle(requirement: &str) -> FileBundle {
    let main_py = python_header(requirement, "Django application entry point.")
        + r#"import os
import sys

import django
from django.core.wsgi import get_wsgi_application

os.environ.setdefault("DJANGO_SETTINGS_MODULE", "config.settings")
django.setup()

application = get_wsgi_application()

if __name__ == "__main__":
    from django.core.management import execute_from_command_line

    execute_from_command_line(sys.argv)
"#;

    let config_py = r#""""Django settings."""

import os

SECRET_KEY = os.environ.get("DJANGO_SECRET_KEY", "change-me")
DEBUG = os.environ.get("DJANGO_DEBUG", "false").lower() == "true"
ALLOWED_HOSTS = os.environ.get("DJANGO_ALLOWED_HOSTS", "localhost").split(",")

INSTALLED_APPS = [
    "django.contrib.admin",
    "django.contrib.auth",
    "django.contrib.contenttypes",
    "rest_framework",
    "app",
]

DATABASES = {
    "default": {
        "ENGINE": "django.db.backends.postgresql",
        "NAME": os.environ.get("POSTGRES_DB", "app"),
        "USER": os.environ.get("POSTGRES_USER", "app"),
        "HOST": os.environ.get("POSTGRES_HOST", "localhost"),
        "PORT": int(os.environ.get("POSTGRES_PORT", "5432")),
    }
}
"#
    .to_string();

    let utils_py = r#""""Shared helpers."""

import logging

logger = logging.getLogger(__name__)


def api_response(data, status="success"):
    """Uniform response envelope."""
    return {"status": status, "data": data}


def require_fields(payload, fields):
    """Return the missing field names, empty when payload is complete."""
    missing = []
    for field in fields:
        if field not in payload:
            missing.append(field)
    return missing
"#
    .to_string();

    let models_py = r#""""Application models."""

from django.db import models


class Item(models.Model):
    """A generic domain record."""

    name = models.CharField(max_length=200)
    description = models.TextField(blank=True)
    created_at = models.DateTimeField(auto_now_add=True)

    def __str__(self):
        return self.name
"#
    .to_string();

    let api_py = r#""""REST endpoints."""

import logging

from django.http import JsonResponse

from utils import api_response

logger = logging.getLogger(__name__)


def health(request):
    """Liveness probe."""
    return JsonResponse(api_response({"healthy": True}))


def items(request):
    """List items."""
    try:
        from models import Item

        names = [item.name for item in Item.objects.all()]
        return JsonResponse(api_response(names))
    except Exception as exc:
        logger.error("items endpoint failed: %s", exc)
        return JsonResponse(api_response(None, status="error"), status=500)
"#
    .to_string();

    let test_main = r#""""Application smoke tests."""

import unittest


class WsgiTestCase(unittest.TestCase):
    """The WSGI module must expose an application callable."""

    def test_application_exists(self):
        import main

        self.assertTrue(callable(main.application))


if __name__ == "__main__":
    unittest.main()
"#
    .to_string();

    let test_utils = r#""""Helper tests."""

import unittest

from utils import api_response, require_fields


class UtilsTestCase(unittest.TestCase):
    def test_api_response_wraps_data(self):
        response = api_response([1, 2])
        self.assertEqual(response["status"], "success")
        self.assertEqual(response["data"], [1, 2])

    def test_require_fields_reports_missing(self):
        missing = require_fields({"name": "x"}, ["name", "owner"])
        self.assertEqual(missing, ["owner"])

    def test_require_fields_handles_none_values(self):
        missing = require_fields({"name": None}, ["name"])
        self.assertEqual(missing, [])


if __name__ == "__main__":
    unittest.main()
"#
    .to_string();

    let test_models = r#""""Model tests."""

import unittest


class ItemModelTestCase(unittest.TestCase):
    def test_str_uses_name(self):
        from models import Item

        item = Item(name="widget")
        self.assertEqual(str(item), "widget")


if __name__ == "__main__":
    unittest.main()
"#
    .to_string();

    let conftest = r#""""Shared pytest fixtures."""

import pytest


@pytest.fixture
def sample_payload():
    return {"name": "widget", "description": "a test item"}
"#
    .to_string();

    let requirements = "django>=4.2\npsycopg2-binary\ndjangorestframework\ncelery\n".to_string();

    let readme = format!(
        "# Django Project\n\n{requirement}\n\n## Quick start\n\n```bash\npip install -r requirements.txt\npython main.py runserver\n```\n\n## Tests\n\n```bash\npython -m pytest\n```\n"
    );

    let env_example = "DJANGO_SECRET_KEY=\nDJANGO_DEBUG=false\nPOSTGRES_DB=app\nPOSTGRES_USER=app\nPOSTGRES_HOST=localhost\nPOSTGRES_PORT=5432\n".to_string();

    let gitignore = "__pycache__/\n*.pyc\n.env\nvenv/\nstaticfiles/\n".to_string();

    let compose = r#"services:
  web:
    build: .
    ports:
      - "8000:8000"
    env_file: .env
    depends_on:
      - db
  db:
    image: postgres:15
    environment:
      POSTGRES_DB: app
      POSTGRES_USER: app
"#
    .to_string();

    let deploy_sh = r#"#!/bin/bash
set -euo pipefail

python manage.py migrate --noinput
python manage.py collectstatic --noinput
gunicorn main:application --bind 0.0.0.0:8000
"#
    .to_string();

    let api_docs = "# API\n\n| Method | Path | Description |\n|--------|------|-------------|\n| GET | /health | Liveness probe |\n| GET | /items | List items |\n".to_string();

    FileBundle {
        main_files: section(vec![
            ("main.py", main_py),
            ("config.py", config_py),
            ("utils.py", utils_py),
            ("models.py", models_py),
            ("api.py", api_py),
        ]),
        test_files: section(vec![
            ("test_main.py", test_main),
            ("test_utils.py", test_utils),
            ("test_models.py", test_models),
            ("conftest.py", conftest),
        ]),
        additional_files: section(vec![
            ("requirements.txt", requirements),
            ("README.md", readme),
            (".env.example", env_example),
            (".gitignore", gitignore),
            ("docker-compose.yml", compose),
            ("scripts/deploy.sh", deploy_sh),
            ("docs/API.md", api_docs),
        ]),
    }
}

fn node_bundle(requirement: &str) -> FileBundle {
    let server_js = format!(
        "/*\n * {requirement}\n *\n * Express application entry point.\n */\n\n"
    ) + r#"const express = require("express");
const config = require("./config");
const logger = require("./utils/logger");
const routes = require("./routes");

const app = express();
app.use(express.json());
app.use("/", routes);

app.use((err, req, res, next) => {
  logger.error(err.message);
  res.status(500).json({ success: false, error: "internal error" });
});

app.listen(config.port, () => {
  logger.info(`listening on ${config.port}`);
});

module.exports = app;
"#;

    let config_index = r#"/* Runtime configuration from the environment. */

module.exports = {
  port: parseInt(process.env.PORT || "3000", 10),
  mongoUrl: process.env.MONGO_URL || "mongodb://localhost:27017/app",
  logLevel: process.env.LOG_LEVEL || "info",
};
"#
    .to_string();

    let logger_js = r#"/* Winston logger shared by every module. */

const winston = require("winston");

module.exports = winston.createLogger({
  level: process.env.LOG_LEVEL || "info",
  format: winston.format.combine(
    winston.format.timestamp(),
    winston.format.json()
  ),
  transports: [new winston.transports.Console()],
});
"#
    .to_string();

    let validator_js = r#"/* Request payload validation helpers. */

function requireFields(payload, fields) {
  const missing = [];
  for (const field of fields) {
    if (payload[field] === undefined || payload[field] === null) {
      missing.push(field);
    }
  }
  return missing;
}

function isNonEmptyString(value) {
  return typeof value === "string" && value.trim().length > 0;
}

module.exports = { requireFields, isNonEmptyString };
"#
    .to_string();

    let routes_index = r#"/* Route registry. */

const express = require("express");
const users = require("./users");

const router = express.Router();

router.get("/health", (req, res) => {
  res.json({ success: true, healthy: true });
});

router.use("/users", users);

module.exports = router;
"#
    .to_string();

    let routes_users = r#"/* User endpoints. */

const express = require("express");
const { requireFields, isNonEmptyString } = require("../utils/validator");

const router = express.Router();
const users = [];

router.get("/", (req, res) => {
  res.json({ success: true, data: users });
});

router.post("/", (req, res) => {
  const missing = requireFields(req.body, ["name"]);
  if (missing.length > 0 || !isNonEmptyString(req.body.name)) {
    return res.status(400).json({ success: false, error: "name is required" });
  }
  const user = { id: users.length + 1, name: req.body.name };
  users.push(user);
  res.status(201).json({ success: true, data: user });
});

module.exports = router;
"#
    .to_string();

    let server_test = r#"/* Server smoke tests. */

const request = require("supertest");
const app = require("../server");

describe("GET /health", () => {
  it("answers healthy", async () => {
    const res = await request(app).get("/health");
    expect(res.statusCode).toBe(200);
    expect(res.body.healthy).toBe(true);
  });
});
"#
    .to_string();

    let users_test = r#"/* User route tests. */

const request = require("supertest");
const app = require("../../server");

describe("users", () => {
  it("rejects a user without a name", async () => {
    const res = await request(app).post("/users").send({});
    expect(res.statusCode).toBe(400);
    expect(res.body.success).toBe(false);
  });

  it("creates and lists users", async () => {
    await request(app).post("/users").send({ name: "ada" });
    const res = await request(app).get("/users");
    expect(res.body.data.length).toBeGreaterThan(0);
  });
});
"#
    .to_string();

    let validator_test = r#"/* Validator unit tests. */

const { requireFields, isNonEmptyString } = require("../../utils/validator");

describe("requireFields", () => {
  it("reports missing and null fields", () => {
    expect(requireFields({ a: 1, b: null }, ["a", "b", "c"])).toEqual(["b", "c"]);
  });

  it("accepts complete payloads", () => {
    expect(requireFields({ a: 1 }, ["a"])).toEqual([]);
  });
});

describe("isNonEmptyString", () => {
  it("rejects blank strings", () => {
    expect(isNonEmptyString("  ")).toBe(false);
    expect(isNonEmptyString("ok")).toBe(true);
  });
});
"#
    .to_string();

    let package_json = r#"{
  "name": "nodejs-api",
  "version": "1.0.0",
  "description": "Node.js API with Express and MongoDB",
  "main": "server.js",
  "scripts": {
    "start": "node server.js",
    "dev": "nodemon server.js",
    "test": "jest"
  },
  "dependencies": {
    "express": "^4.18.2",
    "mongoose": "^7.5.0",
    "winston": "^3.10.0",
    "dotenv": "^16.3.1"
  },
  "devDependencies": {
    "jest": "^29.6.2",
    "supertest": "^6.3.3",
    "nodemon": "^3.0.1"
  }
}
"#
    .to_string();

    let readme = format!(
        "# Node.js API Project\n\n{requirement}\n\n## Quick start\n\n```bash\nnpm install\nnpm run dev\n```\n\n## Tests\n\n```bash\nnpm test\n```\n"
    );

    let env_example =
        "PORT=3000\nMONGO_URL=mongodb://localhost:27017/app\nLOG_LEVEL=info\n".to_string();

    let gitignore = "node_modules/\n.env\ncoverage/\ndist/\n".to_string();

    let compose = r#"services:
  api:
    build: .
    ports:
      - "3000:3000"
    env_file: .env
    depends_on:
      - mongo
  mongo:
    image: mongo:7
"#
    .to_string();

    let jest_config = r#"module.exports = {
  testEnvironment: "node",
  collectCoverageFrom: ["**/*.js", "!node_modules/**", "!coverage/**"],
};
"#
    .to_string();

    let api_docs = "# API\n\n| Method | Path | Description |\n|--------|------|-------------|\n| GET | /health | Liveness probe |\n| GET | /users | List users |\n| POST | /users | Create a user |\n".to_string();

    FileBundle {
        main_files: section(vec![
            ("server.js", server_js),
            ("config/index.js", config_index),
            ("utils/logger.js", logger_js),
            ("utils/validator.js", validator_js),
            ("routes/index.js", routes_index),
            ("routes/users.js", routes_users),
        ]),
        test_files: section(vec![
            ("test/server.test.js", server_test),
            ("test/routes/users.test.js", users_test),
            ("test/utils/validator.test.js", validator_test),
        ]),
        additional_files: section(vec![
            ("package.json", package_json),
            ("README.md", readme),
            (".env.example", env_example),
            (".gitignore", gitignore),
            ("docker-compose.yml", compose),
            ("jest.config.js", jest_config),
            ("docs/API.md", api_docs),
        ]),
    }
}

fn generic_bundle(requirement: &str) -> FileBundle {
    let main_py = python_header(requirement, "Application entry point.")
        + r#"import logging

from config import load_config
from utils import api_response

logging.basicConfig(level=logging.INFO)
logger = logging.getLogger(__name__)


class Application:
    """Minimal application shell."""

    def __init__(self, config=None):
        self.config = config or load_config()

    def health_check(self):
        """Report liveness."""
        return api_response({"healthy": True})

    def process(self, payload):
        """Handle one request payload."""
        try:
            if payload is None:
                raise ValueError("payload is required")
            return api_response({"echo": payload})
        except ValueError as exc:
            logger.error("process failed: %s", exc)
            return api_response(None, status="error")


if __name__ == "__main__":
    app = Application()
    print(app.health_check())
"#;

    let config_py = r#""""Configuration loading."""

import os


def load_config():
    """Read settings from the environment."""
    return {
        "debug": os.environ.get("APP_DEBUG", "false").lower() == "true",
        "log_level": os.environ.get("APP_LOG_LEVEL", "INFO"),
    }
"#
    .to_string();

    let utils_py = r#""""Shared helpers."""


def api_response(data, status="success"):
    """Uniform response envelope."""
    return {"status": status, "data": data}
"#
    .to_string();

    let test_main = r#""""Application tests."""

import unittest

from main import Application


class ApplicationTestCase(unittest.TestCase):
    def setUp(self):
        self.app = Application(config={"debug": False})

    def test_health_check(self):
        result = self.app.health_check()
        self.assertEqual(result["status"], "success")
        self.assertTrue(result["data"]["healthy"])

    def test_process_echoes_payload(self):
        result = self.app.process({"value": 1})
        self.assertEqual(result["data"]["echo"], {"value": 1})

    def test_process_rejects_none(self):
        result = self.app.process(None)
        self.assertEqual(result["status"], "error")


if __name__ == "__main__":
    unittest.main()
"#
    .to_string();

    let test_utils = r#""""Helper tests."""

import unittest

from utils import api_response


class ApiResponseTestCase(unittest.TestCase):
    def test_default_status(self):
        self.assertEqual(api_response(1)["status"], "success")

    def test_error_status(self):
        self.assertEqual(api_response(None, status="error")["status"], "error")


if __name__ == "__main__":
    unittest.main()
"#
    .to_string();

    FileBundle {
        main_files: section(vec![
            ("main.py", main_py),
            ("config.py", config_py),
            ("utils.py", utils_py),
        ]),
        test_files: section(vec![("test_main.py", test_main), ("test_utils.py", test_utils)]),
        additional_files: fallback_additional_files(requirement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_has_three_complete_options() {
        let stacks = fallback_tech_stacks();
        assert_eq!(stacks.len(), 3);
        let ids: Vec<u32> = stacks.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        for stack in &stacks {
            assert!(!stack.name.is_empty());
            assert!(!stack.language.is_empty());
            assert!(!stack.dependencies.is_empty());
            assert!(!stack.best_use_case.is_empty());
        }
        assert_eq!(stacks[0].family, StackFamily::DjangoLike);
        assert_eq!(stacks[1].family, StackFamily::NodeLike);
        assert_eq!(stacks[2].family, StackFamily::Generic);
    }

    #[test]
    fn fallback_structure_is_normalized() {
        let structure = fallback_structure("demo");
        assert!(structure.success);
        assert!(structure.layout.directories.keys().all(|k| k.ends_with('/')));
        assert!(structure.file_count() >= 10);
    }

    #[test]
    fn family_bundles_have_their_expected_files() {
        let django = fallback_bundle(StackFamily::DjangoLike, "a shop backend");
        assert!(django.main_files.contains_key("main.py"));
        assert!(django.main_files.contains_key("api.py"));
        assert!(django.test_files.contains_key("conftest.py"));
        assert!(django.additional_files.contains_key("scripts/deploy.sh"));

        let node = fallback_bundle(StackFamily::NodeLike, "a chat server");
        assert!(node.main_files.contains_key("server.js"));
        assert!(node.test_files.contains_key("test/server.test.js"));
        assert!(node.additional_files.contains_key("package.json"));

        let generic = fallback_bundle(StackFamily::Generic, "a data tool");
        assert_eq!(generic.main_files.len(), 3);
        assert_eq!(generic.test_files.len(), 2);
        assert_eq!(generic.additional_files.len(), 4);
    }

    #[test]
    fn bundles_have_no_cross_section_collisions() {
        for family in [
            StackFamily::DjangoLike,
            StackFamily::NodeLike,
            StackFamily::Generic,
        ] {
            let mut bundle = fallback_bundle(family, "requirement text");
            assert!(bundle.enforce_unique().is_empty());
        }
    }

    #[test]
    fn requirement_lands_in_headers_and_readme() {
        let requirement = "track beehive telemetry";
        for family in [
            StackFamily::DjangoLike,
            StackFamily::NodeLike,
            StackFamily::Generic,
        ] {
            let bundle = fallback_bundle(family, requirement);
            let first_main = bundle.main_files.values().next().expect("main file");
            assert!(first_main.contains(requirement));
            let readme = bundle
                .additional_files
                .get("README.md")
                .expect("readme present");
            assert!(readme.contains(requirement));
        }
    }

    #[test]
    fn raw_wrappers_produce_single_files() {
        let main = wrap_main_raw("print('hi')");
        assert_eq!(main.len(), 1);
        assert_eq!(main.get("main.py").map(String::as_str), Some("print('hi')"));

        let tests = wrap_test_raw("assert True");
        assert_eq!(tests.get("test_main.py").map(String::as_str), Some("assert True"));
    }
}
