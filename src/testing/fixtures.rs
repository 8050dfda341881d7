//! Canned model replies and sample sources shared across tests.
//!
//! The JSON fixtures are shaped exactly like cooperative model output, so
//! tests can drive the full decode path instead of constructing typed
//! values by hand.

/// Three complete stack options, the shape a cooperative model returns.
pub const STACK_OPTIONS_REPLY: &str = r#"[
  {
    "id": 1,
    "name": "Python FastAPI Stack",
    "language": "Python 3.11",
    "framework": "FastAPI",
    "database": "PostgreSQL",
    "dependencies": ["fastapi", "uvicorn", "sqlalchemy", "pydantic"],
    "tools": ["pip", "poetry", "git", "docker"],
    "deployment": "Docker + Cloud Run",
    "pros": ["High performance", "Automatic API docs", "Type hints throughout"],
    "cons": ["Smaller ecosystem than Django"],
    "complexity": "Intermediate",
    "estimated_time": "3-5 weeks",
    "best_use_case": "REST APIs and microservices"
  },
  {
    "id": 2,
    "name": "Django Monolith Stack",
    "language": "Python 3.11",
    "framework": "Django 4.2",
    "database": "PostgreSQL",
    "dependencies": ["django", "djangorestframework", "celery"],
    "tools": ["pip", "virtualenv", "git", "docker"],
    "deployment": "Docker + AWS",
    "pros": ["Batteries included", "Mature ORM", "Large community"],
    "cons": ["Heavier than needed for small apps", "Slower iteration"],
    "complexity": "Intermediate",
    "estimated_time": "4-6 weeks",
    "best_use_case": "Web applications with complex business logic"
  },
  {
    "id": 3,
    "name": "Node Express Stack",
    "language": "JavaScript",
    "framework": "Express",
    "database": "MongoDB",
    "dependencies": ["express", "mongoose", "socket.io"],
    "tools": ["npm", "eslint", "jest"],
    "deployment": "Vercel + MongoDB Atlas",
    "pros": ["One language across the stack", "Huge package ecosystem"],
    "cons": ["Callback-heavy legacy patterns", "Runtime type errors"],
    "complexity": "Advanced",
    "estimated_time": "6-8 weeks",
    "best_use_case": "Real-time applications"
  }
]"#;

/// A project structure reply consistent with the FastAPI option above.
pub const STRUCTURE_REPLY: &str = r#"{
  "success": true,
  "project_name": "task_api",
  "structure": {
    "root_files": ["README.md", "requirements.txt", ".gitignore", ".env.example"],
    "directories": {
      "src/": ["main.py", "config.py", "models.py"],
      "tests/": ["test_main.py", "conftest.py"],
      "docs/": ["API.md"]
    }
  },
  "dependencies": {
    "main": ["fastapi", "uvicorn", "sqlalchemy"],
    "dev": ["black", "ruff"],
    "test": ["pytest", "httpx"]
  },
  "description": "FastAPI service layout with src and tests split"
}"#;

/// A main-section reply using the `files` wrapper key.
pub const MAIN_FILES_REPLY: &str = r#"{
  "success": true,
  "files": {
    "main.py": "import logging\n\nfrom fastapi import FastAPI\n\napp = FastAPI()\n\n\n@app.get('/health')\ndef health():\n    return {'status': 'ok'}\n",
    "config.py": "import os\n\nDATABASE_URL = os.environ.get('DATABASE_URL', 'sqlite:///./app.db')\n",
    "models.py": "from sqlalchemy.orm import declarative_base\n\nBase = declarative_base()\n"
  }
}"#;

/// A test-section reply using the `test_files` wrapper key.
pub const TEST_FILES_REPLY: &str = r#"{
  "success": true,
  "test_files": {
    "test_main.py": "from fastapi.testclient import TestClient\n\nfrom main import app\n\nclient = TestClient(app)\n\n\ndef test_health():\n    response = client.get('/health')\n    assert response.status_code == 200\n",
    "conftest.py": "import pytest\n"
  }
}"#;

/// An additional-section reply using the `additional_files` wrapper key.
pub const ADDITIONAL_FILES_REPLY: &str = r#"{
  "success": true,
  "additional_files": {
    "requirements.txt": "fastapi==0.110.0\nuvicorn==0.29.0\nsqlalchemy==2.0.29\n",
    "README.md": "Task API service.\n\nRun with uvicorn main:app --reload.\n",
    ".gitignore": "__pycache__/\n*.pyc\n.env\n",
    ".env.example": "DATABASE_URL=sqlite:///./app.db\n"
  }
}"#;

/// Wrap a payload the way chatty models tend to.
pub fn wrapped_in_prose(payload: &str) -> String {
    format!(
        "Sure! Here is the JSON you asked for:\n\n```json\n{}\n```\n\nLet me know if you need anything else.",
        payload
    )
}

/// Python that passes every deployment check band comfortably.
pub const WELL_FORMED_PYTHON: &str = r#"import logging

logger = logging.getLogger(__name__)


def load_entries(path):
    """Read one entry per line from the given file."""
    entries = []
    try:
        with open(path) as handle:
            for line in handle:
                # skip blank lines
                stripped = line.strip()
                if stripped:
                    entries.append(stripped)
    except OSError:
        logger.warning("could not read %s", path)
        # treat unreadable files as empty
    return entries
"#;

/// Tests that exercise the sample above.
pub const WELL_FORMED_PYTHON_TESTS: &str = r#"import pytest

from entries import load_entries


def test_load_entries_skips_blanks(tmp_path):
    target = tmp_path / "entries.txt"
    target.write_text("one\n\ntwo\n")
    assert load_entries(target) == ["one", "two"]


def test_load_entries_missing_file_is_empty(tmp_path):
    assert load_entries(tmp_path / "absent.txt") == []
"#;

/// Python with enough problems to trip the security and quality checks.
pub const RISKY_PYTHON: &str = r#"import os

password = "hunter2"

def run(command):
    eval(command)
    os.system(command)
"#;
