//! End-to-end election scenarios, driven through the public `Election` API
//! with nullable access control and a recording notifier.

use std::cell::RefCell;
use std::sync::Arc;
use std::thread;

use ballot_election::{
    AccessControl, Election, ElectionError, ElectionEvent, Proposal, TallyResult,
};
use ballot_nullables::{NullAccessControl, NullNotifier};
use ballot_types::{Principal, WorkflowPhase};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    election: Election,
    access: Arc<NullAccessControl>,
    notifier: Arc<NullNotifier>,
}

fn principal(name: &str) -> Principal {
    Principal::new(name)
}

fn harness() -> Harness {
    let access = Arc::new(NullAccessControl::new(principal("admin")));
    let notifier = Arc::new(NullNotifier::new());
    let election = Election::new(access.clone(), notifier.clone());
    Harness {
        election,
        access,
        notifier,
    }
}

impl Harness {
    fn as_voter<T>(&self, name: &str, f: impl FnOnce(&Election) -> T) -> T {
        self.access.act_as(&principal(name));
        let out = f(&self.election);
        self.access.act_as_admin();
        out
    }

    /// Register `voters`, have `voters[i]` submit one proposal per entry in
    /// `proposals`, and open voting.
    fn open_voting(&self, voters: &[&str], proposals: &[&str]) {
        for v in voters {
            self.election.register_voter(&principal(v)).unwrap();
        }
        self.election.start_proposals_registration().unwrap();
        for (i, description) in proposals.iter().enumerate() {
            let submitter = voters[i % voters.len()];
            let index = self
                .as_voter(submitter, |e| e.register_proposal(*description))
                .unwrap();
            assert_eq!(index, i);
        }
        self.election.end_proposals_registration().unwrap();
        self.election.start_voting_session().unwrap();
    }

    /// Run a full election where proposal `i` receives `counts[i]` votes.
    fn run_with_counts(&self, counts: &[usize]) {
        let total: usize = counts.iter().sum();
        let names: Vec<String> = (0..total.max(1)).map(|i| format!("v{i}")).collect();
        let voters: Vec<&str> = names.iter().map(String::as_str).collect();
        let descriptions: Vec<String> = (0..counts.len()).map(|i| format!("P{i}")).collect();
        let proposals: Vec<&str> = descriptions.iter().map(String::as_str).collect();
        self.open_voting(&voters, &proposals);

        let mut next_voter = 0;
        for (index, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                self.as_voter(voters[next_voter], |e| e.vote(index)).unwrap();
                next_voter += 1;
            }
        }
        self.election.end_voting_session().unwrap();
    }

    fn assert_votes_balanced(&self) {
        let snapshot = self.election.snapshot();
        let total: u64 = snapshot.proposals.iter().map(|p| p.vote_count).sum();
        assert_eq!(total as usize, snapshot.votes_cast);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_single_winner() {
    let h = harness();
    h.open_voting(&["A", "B", "C"], &["P0", "P1"]);

    h.as_voter("A", |e| e.vote(1)).unwrap();
    h.as_voter("B", |e| e.vote(1)).unwrap();
    h.as_voter("C", |e| e.vote(0)).unwrap();
    h.election.end_voting_session().unwrap();
    h.election.tally_votes().unwrap();

    assert_eq!(h.election.current_phase(), WorkflowPhase::VotesTallied);
    assert_eq!(h.election.get_proposal(0).unwrap().vote_count, 1);
    assert_eq!(h.election.get_proposal(1).unwrap().vote_count, 2);
    assert_eq!(h.election.tally_result(), Some(TallyResult::Winner(1)));
    assert_eq!(
        h.election.get_winner().unwrap(),
        Proposal {
            description: "P1".into(),
            vote_count: 2,
        }
    );
    assert_eq!(h.election.get_voter(&principal("C")).unwrap().voted_proposal_index, Some(0));
}

#[test]
fn end_to_end_event_log() {
    let h = harness();
    h.open_voting(&["A", "B"], &["P0"]);
    h.as_voter("B", |e| e.vote(0)).unwrap();
    h.election.end_voting_session().unwrap();
    h.election.tally_votes().unwrap();

    let status = |previous, next| ElectionEvent::WorkflowStatusChange { previous, next };
    use WorkflowPhase::*;
    assert_eq!(
        h.notifier.events(),
        vec![
            ElectionEvent::VoterRegistered { voter: principal("A") },
            ElectionEvent::VoterRegistered { voter: principal("B") },
            status(RegisteringVoters, ProposalsRegistrationStarted),
            ElectionEvent::ProposalRegistered { index: 0 },
            status(ProposalsRegistrationStarted, ProposalsRegistrationEnded),
            status(ProposalsRegistrationEnded, VotingSessionStarted),
            ElectionEvent::Voted {
                voter: principal("B"),
                index: 0,
            },
            status(VotingSessionStarted, VotingSessionEnded),
            status(VotingSessionEnded, VotesTallied),
        ]
    );
}

#[test]
fn clear_winner_is_first_proposal() {
    let h = harness();
    h.run_with_counts(&[5, 3, 2]);
    h.election.tally_votes().unwrap();

    assert_eq!(h.election.tally_result(), Some(TallyResult::Winner(0)));
    let winner = h.election.get_winner().unwrap();
    assert_eq!(winner.description, "P0");
    assert_eq!(winner.vote_count, 5);
    assert!(!h
        .notifier
        .events()
        .iter()
        .any(|e| matches!(e, ElectionEvent::TieDetected { .. })));
}

#[test]
fn tie_publishes_indices_and_has_no_winner() {
    let h = harness();
    h.run_with_counts(&[3, 3, 1]);
    h.notifier.take();
    h.election.tally_votes().unwrap();

    assert_eq!(
        h.notifier.events(),
        vec![
            ElectionEvent::WorkflowStatusChange {
                previous: WorkflowPhase::VotingSessionEnded,
                next: WorkflowPhase::VotesTallied,
            },
            ElectionEvent::TieDetected {
                indices: vec![0, 1]
            },
        ]
    );
    assert_eq!(
        h.election.get_winner(),
        Err(ElectionError::NoWinner(vec![0, 1]))
    );
}

#[test]
fn tally_without_proposals_fails_cleanly() {
    let h = harness();
    h.election.register_voter(&principal("A")).unwrap();
    h.election.start_proposals_registration().unwrap();
    h.election.end_proposals_registration().unwrap();
    h.election.start_voting_session().unwrap();
    h.election.end_voting_session().unwrap();
    let before = h.notifier.len();

    assert_eq!(h.election.tally_votes(), Err(ElectionError::NoProposals));
    assert_eq!(h.election.current_phase(), WorkflowPhase::VotingSessionEnded);
    assert_eq!(h.notifier.len(), before);
    assert!(matches!(
        h.election.get_winner(),
        Err(ElectionError::WrongPhase { .. })
    ));
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn voter_registers_exactly_once() {
    let h = harness();
    let alice = principal("alice");
    h.election.register_voter(&alice).unwrap();
    assert_eq!(
        h.election.register_voter(&alice),
        Err(ElectionError::AlreadyRegistered(alice.clone()))
    );
    assert_eq!(h.notifier.len(), 1);
}

#[test]
fn administrator_cannot_register_self() {
    let h = harness();
    let admin = h.access.administrator().clone();
    assert_eq!(
        h.election.register_voter(&admin),
        Err(ElectionError::SelfRegistrationForbidden)
    );
    assert_eq!(
        h.election.get_voter(&admin),
        Err(ElectionError::NotRegisteredVoter(admin))
    );
}

#[test]
fn only_administrator_registers_voters() {
    let h = harness();
    h.election.register_voter(&principal("alice")).unwrap();
    let err = h
        .as_voter("alice", |e| e.register_voter(&principal("bob")))
        .unwrap_err();
    assert_eq!(err, ElectionError::Unauthorized(principal("alice")));
}

#[test]
fn registration_closes_with_voter_phase() {
    let h = harness();
    h.election.start_proposals_registration().unwrap();
    assert_eq!(
        h.election.register_voter(&principal("late")),
        Err(ElectionError::WrongPhase {
            required: WorkflowPhase::RegisteringVoters,
            current: WorkflowPhase::ProposalsRegistrationStarted,
        })
    );
}

// ---------------------------------------------------------------------------
// Proposals and votes
// ---------------------------------------------------------------------------

#[test]
fn proposals_only_accepted_while_open() {
    let h = harness();
    h.election.register_voter(&principal("A")).unwrap();

    let try_submit = |h: &Harness| {
        for caller in ["A", "admin", "stranger"] {
            let result = h.as_voter(caller, |e| e.register_proposal("idea"));
            assert!(
                matches!(result, Err(ElectionError::WrongPhase { .. })),
                "{caller} in {} got {result:?}",
                h.election.current_phase()
            );
        }
    };

    try_submit(&h);
    h.election.start_proposals_registration().unwrap();
    h.as_voter("A", |e| e.register_proposal("idea")).unwrap();
    h.election.end_proposals_registration().unwrap();
    try_submit(&h);
    h.election.start_voting_session().unwrap();
    try_submit(&h);
    h.election.end_voting_session().unwrap();
    try_submit(&h);
    h.election.tally_votes().unwrap();
    try_submit(&h);
}

#[test]
fn unregistered_caller_cannot_propose_or_vote() {
    let h = harness();
    h.open_voting(&["A"], &["P0"]);
    assert_eq!(
        h.as_voter("eve", |e| e.vote(0)),
        Err(ElectionError::NotRegisteredVoter(principal("eve")))
    );
    assert_eq!(h.election.get_proposal(0).unwrap().vote_count, 0);
}

#[test]
fn second_vote_is_rejected_and_changes_nothing() {
    let h = harness();
    h.open_voting(&["A", "B"], &["P0", "P1"]);
    h.as_voter("A", |e| e.vote(0)).unwrap();
    let events_before = h.notifier.len();

    assert_eq!(
        h.as_voter("A", |e| e.vote(1)),
        Err(ElectionError::AlreadyVoted(principal("A")))
    );
    assert_eq!(h.election.get_proposal(0).unwrap().vote_count, 1);
    assert_eq!(h.election.get_proposal(1).unwrap().vote_count, 0);
    assert_eq!(h.notifier.len(), events_before);
    h.assert_votes_balanced();
}

#[test]
fn vote_for_missing_proposal_is_rejected() {
    let h = harness();
    h.open_voting(&["A"], &["P0"]);
    assert_eq!(
        h.as_voter("A", |e| e.vote(1)),
        Err(ElectionError::InvalidProposalIndex { index: 1, count: 1 })
    );
    // The failed attempt does not use up the ballot.
    h.as_voter("A", |e| e.vote(0)).unwrap();
    h.assert_votes_balanced();
}

#[test]
fn get_proposal_works_in_every_phase() {
    let h = harness();
    assert!(matches!(
        h.election.get_proposal(0),
        Err(ElectionError::InvalidProposalIndex { index: 0, count: 0 })
    ));
    h.open_voting(&["A"], &["P0"]);
    assert_eq!(h.election.get_proposal(0).unwrap().description, "P0");
    assert_eq!(h.election.proposals().len(), 1);
}

#[test]
fn winner_hidden_until_tallied() {
    let h = harness();
    h.run_with_counts(&[1]);
    assert_eq!(
        h.election.get_winner(),
        Err(ElectionError::WrongPhase {
            required: WorkflowPhase::VotesTallied,
            current: WorkflowPhase::VotingSessionEnded,
        })
    );
}

#[test]
fn notification_failure_does_not_roll_back() {
    let h = harness();
    h.notifier.set_failing(true);
    h.open_voting(&["A"], &["P0"]);
    h.as_voter("A", |e| e.vote(0)).unwrap();

    assert_eq!(h.election.current_phase(), WorkflowPhase::VotingSessionStarted);
    assert_eq!(h.election.get_proposal(0).unwrap().vote_count, 1);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

thread_local! {
    static THREAD_CALLER: RefCell<Option<Principal>> = const { RefCell::new(None) };
}

/// Access control where each thread names its own caller.
struct PerThreadAccess {
    admin: Principal,
}

impl AccessControl for PerThreadAccess {
    fn current_caller(&self) -> Principal {
        THREAD_CALLER.with(|c| c.borrow().clone().unwrap_or_else(|| self.admin.clone()))
    }

    fn is_administrator(&self, principal: &Principal) -> bool {
        *principal == self.admin
    }
}

#[test]
fn concurrent_votes_are_serialized() {
    const VOTERS: usize = 32;
    let notifier = Arc::new(NullNotifier::new());
    let election = Election::new(
        Arc::new(PerThreadAccess {
            admin: principal("admin"),
        }),
        notifier.clone(),
    );
    let voters: Vec<Principal> = (0..VOTERS).map(|i| principal(&format!("v{i}"))).collect();
    for v in &voters {
        election.register_voter(v).unwrap();
    }
    election.start_proposals_registration().unwrap();
    THREAD_CALLER.with(|c| *c.borrow_mut() = Some(voters[0].clone()));
    for i in 0..3 {
        election.register_proposal(format!("P{i}")).unwrap();
    }
    THREAD_CALLER.with(|c| *c.borrow_mut() = None);
    election.end_proposals_registration().unwrap();
    election.start_voting_session().unwrap();

    thread::scope(|s| {
        for (i, v) in voters.iter().enumerate() {
            let election = &election;
            s.spawn(move || {
                THREAD_CALLER.with(|c| *c.borrow_mut() = Some(v.clone()));
                election.vote(i % 3).unwrap();
                assert!(matches!(
                    election.vote(i % 3),
                    Err(ElectionError::AlreadyVoted(_))
                ));
            });
            s.spawn(move || {
                let snapshot = election.snapshot();
                let total: u64 = snapshot.proposals.iter().map(|p| p.vote_count).sum();
                assert_eq!(total as usize, snapshot.votes_cast);
            });
        }
    });

    let snapshot = election.snapshot();
    assert_eq!(snapshot.votes_cast, VOTERS);
    let counts: Vec<u64> = snapshot.proposals.iter().map(|p| p.vote_count).collect();
    assert_eq!(counts, vec![11, 11, 10]);

    let voted_events = notifier
        .events()
        .iter()
        .filter(|e| matches!(e, ElectionEvent::Voted { .. }))
        .count();
    assert_eq!(voted_events, VOTERS);
}
