// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod api_tests;
pub mod credit_ledger_test;
pub mod generate_script_test;
pub mod helpers;
pub mod llm_text_generator_test;
pub mod payment_test;
pub mod referral_test;
