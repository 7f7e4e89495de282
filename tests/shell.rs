use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdout, Stdio};
use std::time::{Duration, Instant};

fn smallsh(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("smallsh").unwrap();
    cmd.env("HOME", home).current_dir(home);
    cmd
}

fn stdout_of(home: &Path, script: &str) -> String {
    let output = smallsh(home).write_stdin(script).output().unwrap();
    assert!(output.status.success(), "smallsh failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

/// Writes a shell script, since the interpreter has no quoting.
fn script(home: &Path, name: &str, body: &str) -> String {
    fs::write(home.join(name), body).unwrap();
    name.to_string()
}

#[test]
fn help_and_version() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: smallsh"));
    smallsh(home.path())
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("smallsh "));
}

#[test]
fn unknown_flag_fails() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path()).arg("--nope").assert().failure();
}

#[test]
fn missing_explicit_config_fails() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .args(["--config", "/nonexistent/smallshrc"])
        .write_stdin("exit\n")
        .assert()
        .failure();
}

#[test]
fn prompt_and_exit() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("exit\necho never\n")
        .assert()
        .success()
        .stdout(predicate::eq(": "));
}

#[test]
fn end_of_input_exits_cleanly() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path()).write_stdin("").assert().success();
}

#[test]
fn status_after_exit_code() {
    let home = tempfile::tempdir().unwrap();
    let exit3 = script(home.path(), "exit3.sh", "exit 3\n");
    let out = stdout_of(home.path(), &format!("status\nsh {}\nstatus\n", exit3));
    assert!(out.contains("exit value 0\n"));
    assert!(out.contains("exit value 3\n"));
}

#[test]
fn status_after_interrupt() {
    let home = tempfile::tempdir().unwrap();
    let interrupt = script(home.path(), "int.sh", "kill -INT $$\nsleep 5\n");
    let out = stdout_of(home.path(), &format!("sh {}\nstatus\n", interrupt));
    assert!(out.contains(&format!("terminated by signal {}", libc::SIGINT)));
}

#[test]
fn unknown_program() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(home.path(), "smallsh-missing-program arg\nstatus\n");
    assert!(out.contains("smallsh-missing-program: no such file or directory\n"));
    assert!(out.contains("exit value 2\n"));
}

#[test]
fn blank_and_comment_lines() {
    let home = tempfile::tempdir().unwrap();
    let exit3 = script(home.path(), "exit3.sh", "exit 3\n");
    let out = stdout_of(
        home.path(),
        &format!("sh {}\n\n   \n# ls -la\n#ls\nstatus\n", exit3),
    );
    assert_eq!(out, ": : : : : : exit value 3\n: ");
}

#[test]
fn redirection_round_trip() {
    let home = tempfile::tempdir().unwrap();
    stdout_of(
        home.path(),
        "echo one two   three > first.txt\ncat < first.txt > second.txt\n",
    );
    let first = fs::read(home.path().join("first.txt")).unwrap();
    assert_eq!(first, b"one two three\n");
    assert_eq!(first, fs::read(home.path().join("second.txt")).unwrap());
}

#[test]
fn missing_input_file() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("cat < missing.txt\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("exit value 1"))
        .stderr(predicate::str::contains("cannot open missing.txt for input"));
}

#[test]
fn unwritable_output_file() {
    let home = tempfile::tempdir().unwrap();
    smallsh(home.path())
        .write_stdin("echo hi > /nonexistent/dir/out.txt\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("exit value 1"))
        .stderr(predicate::str::contains("for output"));
}

#[test]
fn pid_placeholder() {
    let home = tempfile::tempdir().unwrap();
    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .env("HOME", home.path())
        .current_dir(home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let pid = child.id();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo file$$ a$$b$$c\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let out = String::from_utf8(output.stdout).unwrap();
    assert!(out.contains(&format!("file{} a{}b{}c\n", pid, pid, pid)));
}

#[test]
fn cd_builtin() {
    let home = tempfile::tempdir().unwrap();
    let home_path = home.path().canonicalize().unwrap();
    fs::create_dir(home.path().join("sub")).unwrap();

    let out = stdout_of(
        home.path(),
        "cd sub\npwd\ncd /nonexistent/smallsh\npwd\ncd\npwd\n",
    );

    let sub = home_path.join("sub");
    let expected = format!(
        ": : {sub}\n: no such directory exists\n: {sub}\n: : {home}\n: ",
        sub = sub.display(),
        home = home_path.display()
    );
    assert_eq!(out, expected);
}

#[test]
fn background_does_not_block_and_is_reaped() {
    let home = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let out = stdout_of(home.path(), "sleep 1 &\nstatus\nsleep 2\nstatus\n");

    let pid: u32 = out
        .split("background pid is ")
        .nth(1)
        .and_then(|rest| rest.lines().next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(out.contains(&format!(
        "child pid: {}, has been terminated\nexit value 0\n",
        pid
    )));
    // Background completions never touch the foreground status.
    assert_eq!(out.matches("exit value 0").count(), 3);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn background_exec_failure_is_reaped_as_a_job() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(home.path(), "smallsh-nope &\nsleep 1\nstatus\nexit\n");

    let pid: u32 = out
        .split("background pid is ")
        .nth(1)
        .and_then(|rest| rest.lines().next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(out.contains("smallsh-nope: no such file or directory\n"));
    assert!(out.contains(&format!(
        "child pid: {}, has been terminated\nexit value 2\n",
        pid
    )));
    // `status` still reports the last foreground command.
    assert!(out.ends_with("exit value 0\n: "));
}

#[test]
fn blocking_redirect_does_not_block_the_interpreter() {
    let home = tempfile::tempdir().unwrap();
    let fifo = std::ffi::CString::new(home.path().join("fifo").to_str().unwrap()).unwrap();
    assert_eq!(unsafe { libc::mkfifo(fifo.as_ptr(), 0o600) }, 0);
    let started = Instant::now();

    let out = stdout_of(home.path(), "cat < fifo &\necho alive\nexit\n");

    assert!(out.contains("background pid is "));
    assert!(out.contains("alive\n"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn exit_terminates_background_children() {
    let home = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let out = stdout_of(home.path(), "sleep 30 &\nexit\n");
    assert!(out.contains("background pid is "));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn foreground_only_from_config() {
    let home = tempfile::tempdir().unwrap();
    fs::write(home.path().join(".smallshrc"), "foreground_only = true\n").unwrap();
    let exit4 = script(home.path(), "exit4.sh", "exit 4\n");

    let out = stdout_of(home.path(), &format!("sh {} &\nstatus\n", exit4));

    assert!(!out.contains("background pid"));
    assert!(out.contains("exit value 4"));
}

#[test]
fn custom_prompt_from_config() {
    let home = tempfile::tempdir().unwrap();
    let rc = home.path().join("custom.rc");
    fs::write(&rc, "prompt = \"smallsh> \"\n").unwrap();

    smallsh(home.path())
        .arg("--config")
        .arg(&rc)
        .write_stdin("exit\n")
        .assert()
        .success()
        .stdout(predicate::eq("smallsh> "));
}

struct Session {
    child: Child,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    fn start(home: &Path) -> Self {
        let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_smallsh"))
            .env("HOME", home)
            .current_dir(home)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let stdout = BufReader::new(child.stdout.take().unwrap());
        let mut session = Session { child, stdout };
        session.send("echo ready\n");
        session.wait_for("ready");
        session
    }

    fn send(&mut self, input: &str) {
        let stdin = self.child.stdin.as_mut().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    fn signal(&self, signo: libc::c_int) {
        assert_eq!(unsafe { libc::kill(self.child.id() as libc::pid_t, signo) }, 0);
    }

    fn wait_for(&mut self, needle: &str) -> String {
        let mut seen = String::new();
        loop {
            let mut line = String::new();
            let read = self.stdout.read_line(&mut line).unwrap();
            assert!(read > 0, "end of output before {:?}: {:?}", needle, seen);
            seen.push_str(&line);
            if line.contains(needle) {
                return seen;
            }
        }
    }

    fn finish(mut self, input: &str) -> String {
        self.send(input);
        drop(self.child.stdin.take());
        let mut rest = String::new();
        self.stdout.read_to_string(&mut rest).unwrap();
        assert!(self.child.wait().unwrap().success());
        rest
    }
}

#[test]
fn mode_toggle_signal() {
    let home = tempfile::tempdir().unwrap();
    let exit4 = script(home.path(), "exit4.sh", "exit 4\n");
    let mut session = Session::start(home.path());

    session.signal(libc::SIGTSTP);
    session.wait_for("Foreground-only mode enabled");

    session.send(&format!("sh {} &\nstatus\necho checked\n", exit4));
    let out = session.wait_for("checked");
    assert!(!out.contains("background pid"));
    assert!(out.contains("exit value 4"));

    session.signal(libc::SIGTSTP);
    session.wait_for("Foreground-only mode disabled");

    let rest = session.finish("sleep 0 &\nexit\n");
    assert!(rest.contains("background pid is "));
}

#[test]
fn interrupt_is_ignored_by_interpreter() {
    let home = tempfile::tempdir().unwrap();
    let mut session = Session::start(home.path());

    session.signal(libc::SIGINT);

    let rest = session.finish("echo alive\nexit\n");
    assert!(rest.contains("alive"));
}
