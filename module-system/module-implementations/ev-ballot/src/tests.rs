use ev_modules_api::default_context::DefaultContext;
use ev_modules_api::{Address, Context, Module, ModuleInfo, WorkingSet};
use ev_state::{InMemoryStorage, StateVecError};
use ev_voter_registry::{RegistryError, VoterRegistry, VoterRegistryConfig};

use crate::{Ballot, BallotConfig, BallotError, CallMessage, Election};

type C = DefaultContext;

const ADMIN: Address = Address::new([1; 32]);
const VOTER: Address = Address::new([3; 32]);

struct Setup {
    ballot: Ballot<C>,
    working_set: WorkingSet<InMemoryStorage>,
}

impl Setup {
    fn new() -> Self {
        let registry = VoterRegistry::<C>::default();
        let ballot = Ballot::<C>::default();
        let mut working_set = WorkingSet::new(InMemoryStorage::new());
        let admin = C::new(ADMIN, 0);

        registry
            .genesis(&VoterRegistryConfig { admin: ADMIN }, &mut working_set)
            .unwrap();
        ballot
            .genesis(&BallotConfig { admin: ADMIN }, &mut working_set)
            .unwrap();
        registry
            .call(
                ev_voter_registry::CallMessage::AuthorizeContract {
                    caller: *ballot.address(),
                },
                &admin,
                &mut working_set,
            )
            .unwrap();
        registry
            .call(
                ev_voter_registry::CallMessage::RegisterVoter {
                    voter: VOTER,
                    personal_id: "CIN123".to_owned(),
                    full_name: "John Doe".to_owned(),
                },
                &admin,
                &mut working_set,
            )
            .unwrap();

        Self {
            ballot,
            working_set,
        }
    }

    fn call(&mut self, sender: Address, now: u64, msg: CallMessage) -> Result<(), BallotError> {
        let context = C::new(sender, now);
        self.ballot
            .call(msg, &context, &mut self.working_set)
            .map(|_| ())
            .map_err(|err| {
                *err.downcast_ref::<BallotError>()
                    .expect("ballot calls fail with a BallotError")
            })
    }

    fn create_election(&mut self, start_time: u64, end_time: u64) -> Result<(), BallotError> {
        self.call(
            ADMIN,
            0,
            CallMessage::CreateElection {
                name: "Presidential Election".to_owned(),
                description: "Choose the president".to_owned(),
                start_time,
                end_time,
            },
        )
    }

    fn add_candidate(&mut self, name: &str) -> Result<(), BallotError> {
        self.call(
            ADMIN,
            0,
            CallMessage::AddCandidate {
                name: name.to_owned(),
                party: "Independent".to_owned(),
                image_ref: format!("ipfs://{name}"),
            },
        )
    }
}

#[test]
fn depends_on_registry() {
    let ballot = Ballot::<C>::default();
    let registry = VoterRegistry::<C>::default();
    assert_eq!(ballot.dependencies(), vec![registry.address()]);
    assert_ne!(ballot.address(), registry.address());
}

#[test]
fn create_election_validates_window() {
    let mut setup = Setup::new();

    assert_eq!(setup.create_election(100, 100), Err(BallotError::InvalidWindow));
    assert_eq!(setup.create_election(200, 100), Err(BallotError::InvalidWindow));
    assert_eq!(setup.ballot.get_election_info(&mut setup.working_set), None);

    setup.create_election(100, 200).unwrap();
    let election = setup
        .ballot
        .get_election_info(&mut setup.working_set)
        .unwrap();
    assert_eq!(election.id, 0);
    assert!(election.is_active);
    assert_eq!((election.start_time, election.end_time), (100, 200));
}

#[test]
fn admin_only_operations() {
    let mut setup = Setup::new();
    let create = CallMessage::CreateElection {
        name: "x".to_owned(),
        description: "y".to_owned(),
        start_time: 1,
        end_time: 2,
    };

    assert_eq!(setup.call(VOTER, 0, create), Err(BallotError::Unauthorized));
    setup.create_election(1, 2).unwrap();
    assert_eq!(
        setup.call(VOTER, 0, CallMessage::EndElection),
        Err(BallotError::Unauthorized)
    );
    assert_eq!(
        setup.call(
            VOTER,
            0,
            CallMessage::AddCandidate {
                name: "c".to_owned(),
                party: "p".to_owned(),
                image_ref: String::new(),
            }
        ),
        Err(BallotError::Unauthorized)
    );
}

#[test]
fn candidates_need_an_active_election() {
    let mut setup = Setup::new();

    assert_eq!(
        setup.add_candidate("Candidate 1"),
        Err(BallotError::NoActiveElection)
    );

    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();
    setup.add_candidate("Candidate 2").unwrap();

    assert_eq!(setup.ballot.get_candidate_count(&mut setup.working_set), 2);
    let second = setup
        .ballot
        .get_candidate(1, &mut setup.working_set)
        .unwrap();
    assert_eq!(second.index, 1);
    assert_eq!(second.name, "Candidate 2");
    assert_eq!(second.vote_count, 0);
    assert_eq!(
        setup.ballot.get_candidate(2, &mut setup.working_set),
        Err(BallotError::IndexOutOfRange)
    );

    setup.call(ADMIN, 0, CallMessage::EndElection).unwrap();
    assert_eq!(
        setup.add_candidate("Candidate 3"),
        Err(BallotError::NoActiveElection)
    );
}

#[test]
fn vote_checks_run_in_order() {
    let mut setup = Setup::new();
    let vote = |index| CallMessage::CastVote {
        candidate_index: index,
    };

    assert_eq!(
        setup.call(VOTER, 150, vote(0)),
        Err(BallotError::NoActiveElection)
    );

    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();

    assert_eq!(setup.call(VOTER, 99, vote(0)), Err(BallotError::NotStarted));
    assert_eq!(setup.call(VOTER, 201, vote(0)), Err(BallotError::Ended));
    assert_eq!(
        setup.call(VOTER, 150, vote(1)),
        Err(BallotError::InvalidCandidate)
    );
    assert_eq!(
        setup.call(Address::from([9; 32]), 150, vote(0)),
        Err(BallotError::Registry(RegistryError::NotRegistered))
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let mut setup = Setup::new();
    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();

    assert!(setup.ballot.is_voting_open(100, &mut setup.working_set));
    assert!(setup.ballot.is_voting_open(200, &mut setup.working_set));
    assert!(!setup.ballot.is_voting_open(201, &mut setup.working_set));

    setup
        .call(
            VOTER,
            200,
            CallMessage::CastVote {
                candidate_index: 0,
            },
        )
        .unwrap();
    assert_eq!(setup.ballot.total_votes(&mut setup.working_set), 1);
}

#[test]
fn vote_is_counted_once() {
    let mut setup = Setup::new();
    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();
    setup.add_candidate("Candidate 2").unwrap();
    let vote = CallMessage::CastVote {
        candidate_index: 1,
    };

    setup.call(VOTER, 150, vote.clone()).unwrap();
    assert_eq!(
        setup.call(VOTER, 151, vote),
        Err(BallotError::Registry(RegistryError::AlreadyVoted))
    );

    let results = setup.ballot.get_results(&mut setup.working_set).unwrap();
    assert_eq!(results.total_votes, 1);
    assert_eq!(results.ranking[0].name, "Candidate 2");
    assert_eq!(results.ranking[0].vote_count, 1);
    assert_eq!(results.ranking[1].name, "Candidate 1");
    assert!(setup
        .working_set
        .events()
        .iter()
        .any(|event| event.key() == "VoterRegistry: mark_voted"));
}

#[test]
fn vote_fails_when_ballot_is_not_authorized() {
    let mut setup = Setup::new();
    let registry = VoterRegistry::<C>::default();
    registry
        .call(
            ev_voter_registry::CallMessage::RevokeContract {
                caller: *setup.ballot.address(),
            },
            &C::new(ADMIN, 0),
            &mut setup.working_set,
        )
        .unwrap();
    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();

    assert_eq!(
        setup.call(
            VOTER,
            150,
            CallMessage::CastVote {
                candidate_index: 0
            }
        ),
        Err(BallotError::Registry(RegistryError::Unauthorized))
    );
    assert!(!registry.has_voter_voted(&VOTER, &mut setup.working_set));
}

#[test]
fn new_election_archives_the_previous_one() {
    let mut setup = Setup::new();
    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();
    setup.create_election(300, 400).unwrap();

    assert_eq!(setup.ballot.election_count(&mut setup.working_set), 2);
    let first = setup
        .ballot
        .get_election(0, &mut setup.working_set)
        .unwrap();
    assert!(!first.is_active);

    let current = setup
        .ballot
        .get_election_info(&mut setup.working_set)
        .unwrap();
    assert_eq!(current.id, 1);
    assert!(current.is_active);
    assert_eq!(setup.ballot.get_candidate_count(&mut setup.working_set), 0);
}

#[test]
fn end_election_is_terminal() {
    let mut setup = Setup::new();
    assert_eq!(
        setup.call(ADMIN, 0, CallMessage::EndElection),
        Err(BallotError::NoActiveElection)
    );

    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();
    setup.call(ADMIN, 500, CallMessage::EndElection).unwrap();

    let election = setup
        .ballot
        .get_election_info(&mut setup.working_set)
        .unwrap();
    assert!(!election.is_active);
    assert!(!setup.ballot.is_voting_open(150, &mut setup.working_set));
    assert_eq!(
        setup.call(
            VOTER,
            150,
            CallMessage::CastVote {
                candidate_index: 0
            }
        ),
        Err(BallotError::NoActiveElection)
    );
}

#[test]
fn tallies_saturate_instead_of_overflowing() {
    let mut setup = Setup::new();
    setup.create_election(100, 200).unwrap();
    setup.add_candidate("Candidate 1").unwrap();
    setup.add_candidate("Candidate 2").unwrap();

    let mut leader = setup
        .ballot
        .candidates
        .get(&(0, 0), &mut setup.working_set)
        .unwrap();
    leader.vote_count = u64::MAX;
    setup
        .ballot
        .candidates
        .set(&(0, 0), &leader, &mut setup.working_set);

    let mut runner_up = leader.clone();
    runner_up.index = 1;
    runner_up.vote_count = 1;
    setup
        .ballot
        .candidates
        .set(&(0, 1), &runner_up, &mut setup.working_set);

    assert_eq!(setup.ballot.total_votes(&mut setup.working_set), u64::MAX);
    let results = setup.ballot.get_results(&mut setup.working_set).unwrap();
    assert_eq!(results.total_votes, u64::MAX);
    assert_eq!(results.ranking[0].index, 0);

    assert_eq!(
        setup.call(
            VOTER,
            150,
            CallMessage::CastVote {
                candidate_index: 0
            }
        ),
        Err(BallotError::TallyOverflow)
    );
}

#[test]
fn candidate_count_cannot_overflow() {
    let mut setup = Setup::new();
    setup.create_election(100, 200).unwrap();
    setup
        .ballot
        .candidate_counts
        .set(&0, &u64::MAX, &mut setup.working_set);

    assert_eq!(
        setup.add_candidate("Candidate 1"),
        Err(BallotError::IndexOutOfRange)
    );
}

#[test]
fn storing_an_unknown_election_is_an_error() {
    let mut setup = Setup::new();
    let election = Election {
        id: 5,
        name: "Presidential Election".to_owned(),
        description: String::new(),
        start_time: 100,
        end_time: 200,
        is_active: false,
    };

    assert_eq!(
        setup
            .ballot
            .store_election(&election, &mut setup.working_set),
        Err(BallotError::History(StateVecError::IndexOutOfBounds {
            index: 5,
            len: 0
        }))
    );
    assert_eq!(setup.ballot.election_count(&mut setup.working_set), 0);
}
