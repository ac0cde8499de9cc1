//! End-to-end tests: commands driven through a session, either by hand or
//! over a mock socket, with the aggregated responses mapped to typed
//! results.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use tokio_test::io::Builder;

use relaymail_imap::command::{AppendCommand, StatusAttribute, StoreMode};
use relaymail_imap::{
    Capabilities, Command, Config, Connection, Error, Flag, ImapFuture, ImapSession, Mailbox,
    ResponseMapper, Result, SequenceSet, SessionState, Transmit, Transport, TypedResult, Uid,
    UidValidity,
};

/// Transport that keeps everything written to it.
#[derive(Default)]
struct Wire {
    sent: Mutex<Vec<String>>,
}

impl Wire {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Wire {
    fn write(&self, transmit: Transmit) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&transmit.data).into_owned());
        Ok(())
    }

    fn close(&self) -> ImapFuture<bool> {
        ImapFuture::completed(true)
    }
}

fn session() -> (Arc<Wire>, ImapSession<Arc<Wire>>) {
    let wire = Arc::new(Wire::default());
    (Arc::clone(&wire), ImapSession::new(Arc::clone(&wire)))
}

#[test]
fn status_command_maps_to_status_info() {
    let (wire, session) = session();
    let future = session
        .execute(Command::Status {
            mailbox: Mailbox::inbox(),
            items: vec![StatusAttribute::Messages, StatusAttribute::UidNext],
        })
        .unwrap();
    assert_eq!(wire.sent(), ["A0001 STATUS INBOX (MESSAGES UIDNEXT)\r\n"]);

    session
        .handle_line("* STATUS INBOX (MESSAGES 3 UIDNEXT 9)\r\n")
        .unwrap();
    session.handle_line("A0001 OK STATUS completed\r\n").unwrap();

    let response = future.get().unwrap();
    let TypedResult::Status(info) = ResponseMapper::map(&response).unwrap() else {
        panic!("expected a status result");
    };
    assert_eq!(info.mailbox, Some(Mailbox::inbox()));
    assert_eq!(info.messages, Some(3));
    assert_eq!(info.uidnext, Uid::new(9));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn append_sends_literal_after_continuation() {
    let (wire, session) = session();
    let append = AppendCommand::new(
        Mailbox::new("Sent"),
        &b"Subject: hi\r\n\r\nbody"[..],
        &Capabilities::new(),
    );
    let future = session.execute(append).unwrap();
    assert_eq!(wire.sent(), ["A0001 APPEND Sent {19}\r\n"]);

    session.handle_line("+ Ready for literal data\r\n").unwrap();
    assert_eq!(wire.sent()[1], "Subject: hi\r\n\r\nbody\r\n");

    session
        .handle_line("A0001 OK [APPENDUID 38505 3955] APPEND completed\r\n")
        .unwrap();
    let response = future.get().unwrap();
    let written: usize = wire.sent().iter().map(String::len).sum();
    assert_eq!(response.request_bytes, written);

    let TypedResult::Append(result) = ResponseMapper::map(&response).unwrap() else {
        panic!("expected an append result");
    };
    assert_eq!(result.uidvalidity, UidValidity::new(38505));
    assert_eq!(result.uids, SequenceSet::single(3955));
}

#[test]
fn conditional_store_reports_modified_messages() {
    let (wire, session) = session();
    let future = session
        .execute(Command::Store {
            sequence: SequenceSet::range(1, 7).unwrap(),
            mode: StoreMode::Add,
            flags: vec![Flag::Seen],
            uid: false,
            silent: false,
            unchanged_since: Some(320),
        })
        .unwrap();
    assert_eq!(
        wire.sent(),
        ["A0001 STORE 1:7 (UNCHANGEDSINCE 320) +FLAGS (\\Seen)\r\n"]
    );

    session
        .handle_line("* 4 FETCH (MODSEQ (321) FLAGS (\\Seen))\r\n")
        .unwrap();
    session
        .handle_line("A0001 NO [MODIFIED 7] Conditional STORE failed\r\n")
        .unwrap();

    let TypedResult::Store(result) = ResponseMapper::map(&future.get().unwrap()).unwrap() else {
        panic!("expected a store result");
    };
    assert!(!result.all_applied());
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].modseq(), Some(321));
    assert!(result.modified.unwrap().contains(7));
}

#[test]
fn one_command_at_a_time() {
    let (_wire, session) = session();
    let first = session.execute(Command::Noop).unwrap();
    assert!(matches!(session.execute(Command::Noop), Err(Error::Busy)));

    session.handle_line("A0001 OK NOOP completed\r\n").unwrap();
    assert!(first.get().unwrap().is_ok());

    let second = session.execute(Command::Capability).unwrap();
    session.handle_line("* CAPABILITY IMAP4rev1 IDLE\r\n").unwrap();
    session.handle_line("A0002 OK done\r\n").unwrap();
    let TypedResult::Capabilities(caps) = ResponseMapper::map(&second.get().unwrap()).unwrap()
    else {
        panic!("expected capabilities");
    };
    assert_eq!(caps.len(), 2);
}

#[test]
fn failed_command_is_data_until_mapped() {
    let (_wire, session) = session();
    let future = session
        .execute(Command::select(Mailbox::new("Nope")))
        .unwrap();
    session
        .handle_line("A0001 NO [NONEXISTENT] no such mailbox\r\n")
        .unwrap();

    let response = future.get().unwrap();
    assert!(!response.is_ok());
    assert!(matches!(
        ResponseMapper::map(&response),
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn select_over_a_connection() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1] ready\r\n")
        .write(b"A0001 SELECT INBOX\r\n")
        .read(b"* 172 EXISTS\r\n* 1 RECENT\r\n")
        .read(b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n")
        .read(b"* OK [UIDNEXT 4392] Predicted next UID\r\n")
        .read(b"* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n")
        .read(b"A0001 OK [READ-WRITE] SELECT completed\r\n")
        .build();
    let connection = Connection::start(mock, &Config::builder("mock").build())
        .await
        .unwrap();

    let response = connection
        .session()
        .execute(Command::select(Mailbox::inbox()))
        .unwrap()
        .wait()
        .await
        .unwrap();

    let TypedResult::Mailbox(info) = ResponseMapper::map(&response).unwrap() else {
        panic!("expected mailbox info");
    };
    assert_eq!(info.exists, 172);
    assert_eq!(info.recent, 1);
    assert_eq!(info.uidvalidity, UidValidity::new(3_857_529_045));
    assert_eq!(info.uidnext, Uid::new(4392));
    assert_eq!(info.flags.len(), 5);
    assert!(!info.read_only);
}

#[tokio::test]
async fn tag_prefix_comes_from_config() {
    let mock = Builder::new()
        .read(b"* PREAUTH welcome\r\n")
        .write(b"rm0001 NOOP\r\n")
        .read(b"rm0001 OK done\r\n")
        .build();
    let config = Config::builder("mock").tag_prefix("rm").build();
    let connection = Connection::start(mock, &config).await.unwrap();

    let response = connection
        .session()
        .execute(Command::Noop)
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(response.tag, "rm0001");
}
