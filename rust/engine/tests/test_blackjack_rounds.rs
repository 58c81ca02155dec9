use greenfelt_engine::blackjack::{hand_value, BlackjackPhase, BlackjackRound, DealerStep};
use greenfelt_engine::cards::{Card, Rank, Suit};
use greenfelt_engine::errors::GameError;
use greenfelt_engine::history::Outcome;
use greenfelt_engine::wallet::{ChipWallet, Wallet};

fn card(rank: Rank) -> Card {
    Card {
        suit: Suit::Spades,
        rank,
    }
}

#[test]
fn ace_adjusts_down_instead_of_busting() {
    // A + 6 + 5 must score 12, not 22
    let hand = [card(Rank::Ace), card(Rank::Six), card(Rank::Five)];
    assert_eq!(hand_value(&hand), 12);
}

#[test]
fn multiple_aces_each_adjust_independently() {
    let hand = [card(Rank::Ace), card(Rank::Ace), card(Rank::Nine)];
    assert_eq!(hand_value(&hand), 21);
    let hand = [
        card(Rank::Ace),
        card(Rank::Ace),
        card(Rank::Ace),
        card(Rank::Eight),
    ];
    assert_eq!(hand_value(&hand), 21);
}

#[test]
fn face_cards_count_ten() {
    let hand = [card(Rank::King), card(Rank::Queen)];
    assert_eq!(hand_value(&hand), 20);
    let hand = [card(Rank::Jack), card(Rank::Ace)];
    assert_eq!(hand_value(&hand), 21, "a natural scores 21");
}

#[test]
fn deal_rejects_zero_stake_and_short_balance() {
    let mut wallet = ChipWallet::new(5);
    let mut round = BlackjackRound::new(Some(1));
    assert_eq!(
        round.deal(0, &mut wallet),
        Err(GameError::InvalidStake { stake: 0 })
    );
    assert_eq!(
        round.deal(10, &mut wallet),
        Err(GameError::InsufficientBalance {
            required: 10,
            available: 5
        })
    );
    assert_eq!(round.phase(), BlackjackPhase::Betting);
    assert_eq!(wallet.balance(), 5, "failed deals must not move chips");
}

#[test]
fn deal_rejects_disconnected_wallet() {
    let mut wallet = ChipWallet::disconnected(100);
    let mut round = BlackjackRound::new(Some(1));
    assert_eq!(round.deal(10, &mut wallet), Err(GameError::NotConnected));
}

#[test]
fn deal_debits_exactly_the_stake() {
    let mut wallet = ChipWallet::new(1000);
    let mut round = BlackjackRound::new(Some(3));
    round.deal(25, &mut wallet).unwrap();
    match round.settlement() {
        // an immediate natural settles at the deal; the credit is 2.5x on a
        // win, the stake back on a push
        Some(s) => {
            let expected = match s.outcome {
                Outcome::Win => 25 * 5 / 2,
                Outcome::Push => 25,
                Outcome::Lose => panic!("a deal can never settle as a loss"),
            };
            assert_eq!(s.payout, expected);
            assert_eq!(wallet.balance(), 1000 - 25 + expected);
        }
        None => {
            assert_eq!(round.phase(), BlackjackPhase::PlayerTurn);
            assert_eq!(wallet.balance(), 1000 - 25);
        }
    }
}

#[test]
fn natural_pays_five_halves_of_the_stake() {
    // sweep seeds until a dealt natural shows up; the rule must hold there
    let mut seen_natural = false;
    for seed in 0..500u64 {
        let mut wallet = ChipWallet::new(1000);
        let mut round = BlackjackRound::new(Some(seed));
        round.deal(10, &mut wallet).unwrap();
        if hand_value(round.player_hand()) == 21 {
            let s = round.settlement().expect("a natural settles immediately");
            match s.outcome {
                Outcome::Win => {
                    assert_eq!(s.payout, 25, "natural pays 2.5x");
                    assert_eq!(wallet.balance(), 1000 - 10 + 25);
                    seen_natural = true;
                }
                Outcome::Push => {
                    assert_eq!(hand_value(round.dealer_hand()), 21);
                    assert_eq!(s.payout, 10, "push returns the stake");
                }
                Outcome::Lose => panic!("a natural can never lose"),
            }
        }
        if seen_natural {
            break;
        }
    }
    assert!(seen_natural, "no natural found in 500 seeds");
}

#[test]
fn bust_settles_immediately_as_a_loss() {
    let mut seen_bust = false;
    for seed in 0..200u64 {
        let mut wallet = ChipWallet::new(1000);
        let mut round = BlackjackRound::new(Some(seed));
        round.deal(10, &mut wallet).unwrap();
        if round.phase() != BlackjackPhase::PlayerTurn {
            continue;
        }
        while round.phase() == BlackjackPhase::PlayerTurn {
            round.hit(&mut wallet).unwrap();
        }
        if round.player_value() > 21 {
            let s = round.settlement().expect("bust settles the round");
            assert_eq!(s.outcome, Outcome::Lose);
            assert_eq!(s.payout, 0);
            assert_eq!(wallet.balance(), 1000 - 10, "a bust credits nothing");
            seen_bust = true;
            break;
        }
    }
    assert!(seen_bust, "hitting every hand must eventually bust");
}

#[test]
fn dealer_draws_under_17_then_settles_by_comparison() {
    let mut tested = 0;
    for seed in 0..100u64 {
        if tested >= 4 {
            break;
        }
        let mut wallet = ChipWallet::new(1000);
        let mut round = BlackjackRound::new(Some(seed));
        round.deal(50, &mut wallet).unwrap();
        if round.phase() != BlackjackPhase::PlayerTurn {
            continue;
        }
        tested += 1;
        round.stand().unwrap();
        assert_eq!(round.phase(), BlackjackPhase::DealerTurn);
        let summary = loop {
            let before = round.dealer_value();
            match round.dealer_step(&mut wallet).unwrap() {
                DealerStep::Drew(_) => {
                    assert!(before < 17, "dealer only draws under 17");
                }
                DealerStep::Settled(s) => {
                    assert!(before >= 17, "dealer stands at 17 or better");
                    break s;
                }
            }
        };
        let player = round.player_value();
        let dealer = round.dealer_value();
        let expected = if dealer > 21 || player > dealer {
            (Outcome::Win, 100)
        } else if player < dealer {
            (Outcome::Lose, 0)
        } else {
            (Outcome::Push, 50)
        };
        assert_eq!((summary.outcome, summary.payout), expected);
        assert_eq!(wallet.balance(), 1000 - 50 + expected.1);
        assert_eq!(round.phase(), BlackjackPhase::Finished);
    }
    assert!(tested >= 1, "no non-natural deal found in 100 seeds");
}

#[test]
fn dealer_hole_card_stays_hidden_until_stand() {
    for seed in 0..100u64 {
        let mut wallet = ChipWallet::new(100);
        let mut round = BlackjackRound::new(Some(seed));
        round.deal(10, &mut wallet).unwrap();
        if round.phase() == BlackjackPhase::PlayerTurn {
            assert_eq!(round.visible_dealer_cards().len(), 1);
            round.stand().unwrap();
            assert_eq!(round.visible_dealer_cards().len(), 2);
            return;
        }
    }
    panic!("no non-natural deal found in 100 seeds");
}

#[test]
fn actions_outside_their_phase_are_rejected() {
    let mut wallet = ChipWallet::new(100);
    let mut round = BlackjackRound::new(Some(2));
    assert_eq!(round.hit(&mut wallet), Err(GameError::NoRoundInProgress));
    assert_eq!(round.stand(), Err(GameError::NoRoundInProgress));
    assert_eq!(
        round.dealer_step(&mut wallet),
        Err(GameError::NoRoundInProgress)
    );

    round.deal(10, &mut wallet).unwrap();
    if round.phase() == BlackjackPhase::PlayerTurn {
        assert_eq!(round.deal(10, &mut wallet), Err(GameError::RoundInProgress));
        assert_eq!(round.reset(), Err(GameError::RoundInProgress));
    }
}

#[test]
fn reset_clears_the_table_for_the_next_round() {
    let mut wallet = ChipWallet::new(1000);
    let mut round = BlackjackRound::new(Some(13));
    round.deal(10, &mut wallet).unwrap();
    if round.phase() == BlackjackPhase::PlayerTurn {
        round.stand().unwrap();
        round.play_dealer(&mut wallet).unwrap();
    }
    assert_eq!(round.phase(), BlackjackPhase::Finished);
    round.reset().unwrap();
    assert_eq!(round.phase(), BlackjackPhase::Betting);
    assert!(round.player_hand().is_empty());
    assert!(round.dealer_hand().is_empty());
    assert_eq!(round.stake(), 0);
    assert!(round.settlement().is_none());
}
