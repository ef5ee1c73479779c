pub mod failure_policy_fl;
